//! Turning observed model replies into stored group state.
//!
//! Hosts publish replies on a [`ResponseHub`]. A reply is correlated to its
//! group through the [`Turn`] handle returned when the host started working
//! on the inbound message, so no global "current group" is needed and turns
//! for different groups may overlap freely.

use crate::{GroupId, GroupState, GroupStore, TagExtractor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Characters of extracted content shown in verbose logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// A model reply produced while handling a message from `group`.
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    pub group: Option<GroupId>,
    pub text: String,
}

/// Receives every reply published on a [`ResponseHub`].
pub trait ResponseObserver: Send + Sync {
    /// Called when the host starts handling a message from `group`.
    fn on_turn_started(&self, _group: Option<&GroupId>) {}

    fn on_response(&self, event: &ResponseEvent);
}

/// Correlation handle for one inbound message.
#[must_use = "a turn must be completed to publish its reply"]
#[derive(Debug)]
pub struct Turn {
    group: Option<GroupId>,
}

impl Turn {
    #[must_use]
    pub const fn group(&self) -> Option<&GroupId> {
        self.group.as_ref()
    }
}

/// Handle returned by [`ResponseHub::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
pub struct ResponseHub {
    observers: RwLock<Vec<(Subscription, Arc<dyn ResponseObserver>)>>,
    next_id: AtomicU64,
}

impl ResponseHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn ResponseObserver>) -> Subscription {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((subscription, observer));
        subscription
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(id, _)| *id != subscription);
        observers.len() != before
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Start handling an inbound message from `group`.
    pub fn begin_turn(&self, group: Option<GroupId>) -> Turn {
        debug!("Turn started for group: {group:?}");
        for observer in self.snapshot() {
            observer.on_turn_started(group.as_ref());
        }
        Turn { group }
    }

    /// Publish the reply produced for `turn`.
    pub fn complete(&self, turn: Turn, text: impl Into<String>) {
        self.publish(&ResponseEvent {
            group: turn.group,
            text: text.into(),
        });
    }

    pub fn publish(&self, event: &ResponseEvent) {
        for observer in self.snapshot() {
            observer.on_response(event);
        }
    }

    // Copied out so observers may (un)subscribe from inside a callback.
    fn snapshot(&self) -> Vec<Arc<dyn ResponseObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}

impl std::fmt::Debug for ResponseHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHub")
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The group's state was replaced; `tags` values were kept.
    Stored { group: GroupId, tags: usize },
    /// The reply had no usable group context and was dropped.
    NoGroup,
}

/// Extracts every configured tag from a reply and replaces the group's state.
#[derive(Debug, Clone)]
pub struct Ingestor {
    extractor: Arc<TagExtractor>,
    store: GroupStore,
    verbose: bool,
}

impl Ingestor {
    #[must_use]
    pub const fn new(extractor: Arc<TagExtractor>, store: GroupStore, verbose: bool) -> Self {
        Self {
            extractor,
            store,
            verbose,
        }
    }

    /// Replace the stored state of `group` with the tags found in `text`.
    ///
    /// Tags that do not occur, or whose content is empty, are left out of
    /// the new state. Repeating the call with the same input leaves the
    /// same state behind. A missing or blank group is dropped.
    pub fn ingest(&self, group: Option<&GroupId>, text: &str) -> IngestOutcome {
        let Some(group) = group.filter(|g| !g.is_blank()) else {
            debug!("Dropping model response without group context");
            return IngestOutcome::NoGroup;
        };

        let mut state = GroupState::new();
        for (tag, content) in self.extractor.extract_all(text) {
            let Some(content) = content.filter(|c| !c.is_empty()) else {
                continue;
            };
            if self.verbose {
                info!("[{group}] Extracted <{tag}>: {}...", preview(&content));
            } else {
                debug!("[{group}] Extracted <{tag}> ({} bytes)", content.len());
            }
            state.insert(tag.clone(), content);
        }

        let tags = state.len();
        self.store.set(group.clone(), state);
        IngestOutcome::Stored {
            group: group.clone(),
            tags,
        }
    }
}

impl ResponseObserver for Ingestor {
    fn on_turn_started(&self, group: Option<&GroupId>) {
        if self.verbose {
            info!("Started processing group: {group:?}");
        } else {
            debug!("Started processing group: {group:?}");
        }
    }

    fn on_response(&self, event: &ResponseEvent) {
        if self.verbose {
            info!("Captured model response for group: {:?}", event.group);
        }
        self.ingest(event.group.as_ref(), &event.text);
    }
}

fn preview(content: &str) -> String {
    content.chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagName;
    use std::sync::Mutex;

    fn ingestor(tags: &[&str]) -> (Ingestor, GroupStore) {
        let tags: Vec<TagName> = tags.iter().map(|t| TagName::new(*t).unwrap()).collect();
        let store = GroupStore::new();
        let extractor = Arc::new(TagExtractor::new(&tags).unwrap());
        (Ingestor::new(extractor, store.clone(), false), store)
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ResponseEvent>>, Mutex<Vec<Option<GroupId>>>);

    impl ResponseObserver for Recorder {
        fn on_turn_started(&self, group: Option<&GroupId>) {
            self.1.lock().unwrap().push(group.cloned());
        }

        fn on_response(&self, event: &ResponseEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn test_stores_found_tags_only() {
        let (ingestor, store) = ingestor(&["think", "memory"]);
        let group = GroupId::from("g");

        let outcome = ingestor.ingest(Some(&group), "<think>嗯？新人？</think>你好");

        assert_eq!(outcome, IngestOutcome::Stored { group: group.clone(), tags: 1 });
        let state = store.get(&group).unwrap();
        assert_eq!(state.get("think"), Some("嗯？新人？"));
        assert!(!state.contains("memory"));
    }

    #[test]
    fn test_missing_group_is_a_no_op() {
        let (ingestor, store) = ingestor(&["think"]);
        assert_eq!(ingestor.ingest(None, "<think>x</think>"), IngestOutcome::NoGroup);
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_group_is_a_no_op() {
        let (ingestor, store) = ingestor(&["think"]);
        assert_eq!(
            ingestor.ingest(Some(&GroupId::from("")), "<think>x</think>"),
            IngestOutcome::NoGroup
        );
        assert_eq!(
            ingestor.ingest(Some(&GroupId::from("  ")), "<think>x</think>"),
            IngestOutcome::NoGroup
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_group_turn_stores_nothing() {
        let (ingestor, store) = ingestor(&["think"]);
        let hub = ResponseHub::new();
        hub.subscribe(Arc::new(ingestor));

        hub.complete(hub.begin_turn(Some(GroupId::from(""))), "<think>x</think>");

        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_observers_see_turn_start() {
        let hub = ResponseHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.subscribe(recorder.clone());

        let turn = hub.begin_turn(Some(GroupId::from("g")));
        let orphan = hub.begin_turn(None);

        assert_eq!(
            *recorder.1.lock().unwrap(),
            vec![Some(GroupId::from("g")), None]
        );
        assert!(recorder.0.lock().unwrap().is_empty());
        hub.complete(turn, "done");
        hub.complete(orphan, "done");
        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_content_is_not_stored() {
        let (ingestor, store) = ingestor(&["think"]);
        let group = GroupId::from("g");
        ingestor.ingest(Some(&group), "<think>   </think>");
        assert!(store.get(&group).unwrap().is_empty());
    }

    #[test]
    fn test_no_configured_tags_stores_empty_state() {
        let (ingestor, store) = ingestor(&[]);
        let group = GroupId::from("g");
        ingestor.ingest(Some(&group), "<think>x</think>");
        assert!(store.get(&group).unwrap().is_empty());
    }

    #[test]
    fn test_turn_carries_group_to_published_event() {
        let hub = ResponseHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.subscribe(recorder.clone());

        let first = hub.begin_turn(Some(GroupId::from("a")));
        let second = hub.begin_turn(Some(GroupId::from("b")));
        hub.complete(second, "reply b");
        hub.complete(first, "reply a");

        let events = recorder.0.lock().unwrap();
        assert_eq!(events[0].group, Some(GroupId::from("b")));
        assert_eq!(events[0].text, "reply b");
        assert_eq!(events[1].group, Some(GroupId::from("a")));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = ResponseHub::new();
        let recorder = Arc::new(Recorder::default());
        let subscription = hub.subscribe(recorder.clone());

        assert!(hub.unsubscribe(subscription));
        assert!(!hub.unsubscribe(subscription));
        hub.publish(&ResponseEvent {
            group: None,
            text: "ignored".to_string(),
        });

        assert_eq!(hub.observer_count(), 0);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ingestor_observes_hub() {
        let (ingestor, store) = ingestor(&["think"]);
        let hub = ResponseHub::new();
        hub.subscribe(Arc::new(ingestor));

        let turn = hub.begin_turn(Some(GroupId::from(42_i64)));
        hub.complete(turn, "<think>observed</think>");

        assert_eq!(
            store.get(&GroupId::from("42")).unwrap().get("think"),
            Some("observed")
        );
    }

    #[test]
    fn test_preview_counts_characters() {
        let long = "记".repeat(150);
        assert_eq!(preview(&long).chars().count(), LOG_PREVIEW_CHARS);
    }
}
