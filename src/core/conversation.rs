use crate::core::constants::NEW_CHAT_TITLE;
use crate::core::message::Message;
use crate::utils::id::unique_id;

/// A named, ordered thread of messages. Titles are never derived from
/// content; every conversation starts as "New chat".
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    fn new() -> Self {
        Self {
            id: unique_id(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: Vec::new(),
        }
    }
}

/// Ordered collection of conversations, most recently created first, plus
/// the pointer to the active one and the pending input buffer.
///
/// Two invariants hold across every operation: the collection is never
/// empty, and the active id resolves to exactly one stored conversation.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: String,
    input: String,
}

impl ConversationStore {
    pub fn new() -> Self {
        let seed = Conversation::new();
        let active_id = seed.id.clone();
        Self {
            conversations: vec![seed],
            active_id,
            input: String::new(),
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &Conversation {
        self.conversations
            .iter()
            .find(|c| c.id == self.active_id)
            .expect("active id resolves to a stored conversation")
    }

    /// Create a fresh empty conversation at the front and make it active.
    pub fn new_chat(&mut self) -> &Conversation {
        let conversation = Conversation::new();
        self.active_id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.input.clear();
        &self.conversations[0]
    }

    /// Switch to the named conversation. Unknown ids are ignored.
    pub fn select_conversation(&mut self, id: &str) {
        if self.conversations.iter().any(|c| c.id == id) {
            self.active_id = id.to_string();
            self.input.clear();
        }
    }

    /// Append a message to the named conversation. Unknown ids are ignored;
    /// no other conversation is touched either way.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) {
        if let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            conversation.messages.push(message);
        }
    }

    /// Remove a conversation. The sole remaining conversation is replaced by
    /// a fresh empty one rather than removed, so the store never reaches
    /// zero. Removing the active conversation promotes the first survivor in
    /// original order.
    pub fn delete_conversation(&mut self, id: &str) {
        if self.conversations.len() == 1 {
            let replacement = Conversation::new();
            self.active_id = replacement.id.clone();
            self.conversations = vec![replacement];
            return;
        }

        let successor = self
            .conversations
            .iter()
            .find(|c| c.id != id)
            .map(|c| c.id.clone());
        self.conversations.retain(|c| c.id != id);

        if self.active_id == id {
            if let Some(successor) = successor {
                self.active_id = successor;
            }
        }
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Flatten the active conversation into the prompt sent upstream, one
    /// `Role: text` line per message.
    pub fn transcript(&self) -> String {
        self.active()
            .messages
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::store_with_chats;

    fn assert_invariants(store: &ConversationStore) {
        assert!(!store.conversations().is_empty());
        let matches = store
            .conversations()
            .iter()
            .filter(|c| c.id == store.active_id())
            .count();
        assert_eq!(matches, 1, "active id resolves to exactly one conversation");
    }

    #[test]
    fn fresh_store_seeds_one_active_conversation() {
        let store = ConversationStore::new();
        assert_invariants(&store);
        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.active().title, NEW_CHAT_TITLE);
        assert!(store.active().messages.is_empty());
    }

    #[test]
    fn new_chat_inserts_at_front_and_activates() {
        let mut store = ConversationStore::new();
        store.set_input("half-typed");
        let id = store.new_chat().id.clone();
        assert_invariants(&store);
        assert_eq!(store.conversations().len(), 2);
        assert_eq!(store.conversations()[0].id, id);
        assert_eq!(store.active_id(), id);
        assert!(store.input().is_empty());
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let mut store = store_with_chats(3);
        let before = store.active_id().to_string();
        store.set_input("draft");
        store.select_conversation("no-such-id");
        assert_eq!(store.active_id(), before);
        assert_eq!(store.input(), "draft");

        let other = store.conversations()[2].id.clone();
        store.select_conversation(&other);
        assert_eq!(store.active_id(), other);
        assert!(store.input().is_empty());
    }

    #[test]
    fn append_targets_exactly_one_conversation() {
        let mut store = store_with_chats(3);
        let target = store.conversations()[1].id.clone();
        let snapshots: Vec<usize> = store
            .conversations()
            .iter()
            .map(|c| c.messages.len())
            .collect();

        store.append_message(&target, Message::user("hello"));

        for (conversation, before) in store.conversations().iter().zip(snapshots) {
            let expected = if conversation.id == target {
                before + 1
            } else {
                before
            };
            assert_eq!(conversation.messages.len(), expected);
        }
    }

    #[test]
    fn append_to_unknown_id_is_a_no_op() {
        let mut store = store_with_chats(2);
        store.append_message("no-such-id", Message::user("lost"));
        assert!(store
            .conversations()
            .iter()
            .all(|c| c.messages.is_empty()));
    }

    #[test]
    fn deleting_the_sole_conversation_replaces_it() {
        let mut store = ConversationStore::new();
        let old_id = store.active_id().to_string();
        store.append_message(&old_id, Message::user("history"));

        store.delete_conversation(&old_id);

        assert_invariants(&store);
        assert_eq!(store.conversations().len(), 1);
        assert_ne!(store.active_id(), old_id);
        assert!(store.active().messages.is_empty());
    }

    #[test]
    fn deleting_a_non_active_conversation_keeps_the_active_id() {
        let mut store = store_with_chats(3);
        let active = store.active_id().to_string();
        let victim = store.conversations()[2].id.clone();

        store.delete_conversation(&victim);

        assert_invariants(&store);
        assert_eq!(store.active_id(), active);
        assert_eq!(store.conversations().len(), 2);
    }

    #[test]
    fn deleting_the_active_conversation_promotes_the_first_survivor() {
        let mut store = store_with_chats(3);
        // Front of the sequence is the newest chat, which is also active.
        let active = store.active_id().to_string();
        let expected = store.conversations()[1].id.clone();

        store.delete_conversation(&active);

        assert_invariants(&store);
        assert_eq!(store.active_id(), expected);
    }

    #[test]
    fn invariants_survive_arbitrary_create_delete_sequences() {
        let mut store = ConversationStore::new();
        for round in 0..20 {
            if round % 3 == 0 {
                store.new_chat();
            }
            let index = round % store.conversations().len();
            let id = store.conversations()[index].id.clone();
            store.delete_conversation(&id);
            assert_invariants(&store);
        }
    }

    #[test]
    fn transcript_flattens_the_active_conversation_in_order() {
        let mut store = ConversationStore::new();
        let id = store.active_id().to_string();
        store.append_message(&id, Message::user("hello"));
        store.append_message(&id, Message::assistant("hi"));
        store.append_message(&id, Message::user("how are you?"));

        assert_eq!(
            store.transcript(),
            "User: hello\nAssistant: hi\nUser: how are you?"
        );
    }
}
