mod conversation {
    use bdi_core::{AgentId, ConversationId};

    use crate::conversation::{Conversation, ConversationStatus};

    #[test]
    fn record_send_with_response_enters_waiting() {
        let mut conv = Conversation::new(ConversationId(1), AgentId(0), AgentId(1), "chat", 0.0);
        conv.record_send(true, AgentId(1), 30.0, 1.0);
        assert_eq!(conv.status, ConversationStatus::Waiting);
        assert_eq!(conv.waiting_for_response_from, Some(AgentId(1)));
        assert_eq!(conv.expected_response_by, Some(31.0));
    }

    #[test]
    fn record_send_without_response_returns_to_active() {
        let mut conv = Conversation::new(ConversationId(1), AgentId(0), AgentId(1), "chat", 0.0);
        conv.record_send(true, AgentId(1), 30.0, 1.0);
        conv.record_send(false, AgentId(0), 0.0, 2.0);
        assert_eq!(conv.status, ConversationStatus::Active);
        assert!(conv.waiting_for_response_from.is_none());
    }

    #[test]
    fn other_participant_resolves_correctly() {
        let conv = Conversation::new(ConversationId(1), AgentId(0), AgentId(1), "chat", 0.0);
        assert_eq!(conv.other_participant(AgentId(0)), Some(AgentId(1)));
        assert_eq!(conv.other_participant(AgentId(1)), Some(AgentId(0)));
        assert_eq!(conv.other_participant(AgentId(9)), None);
    }

    #[test]
    fn ended_conversation_is_not_active() {
        let mut conv = Conversation::new(ConversationId(1), AgentId(0), AgentId(1), "chat", 0.0);
        assert!(conv.is_active());
        conv.end(5.0);
        assert!(!conv.is_active());
        assert_eq!(conv.ended_at, Some(5.0));
    }
}

mod hub {
    use bdi_core::AgentId;

    use crate::hub::CommunicationHub;
    use crate::message::{Message, MessageType};

    #[test]
    fn register_agent_is_idempotent() {
        let mut hub = CommunicationHub::new();
        hub.register_agent(AgentId(0));
        hub.register_agent(AgentId(0));
        assert!(hub.is_registered(AgentId(0)));
    }

    #[test]
    fn start_conversation_reuses_existing_active_one() {
        let mut hub = CommunicationHub::new();
        let a = AgentId(0);
        let b = AgentId(1);
        hub.register_agent(a);
        hub.register_agent(b);
        let first = hub.start_conversation(a, b, "chat", 0.0);
        let second = hub.start_conversation(b, a, "chat again", 1.0);
        assert_eq!(first, second);
    }

    #[test]
    fn start_conversation_after_end_creates_a_new_one() {
        let mut hub = CommunicationHub::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let first = hub.start_conversation(a, b, "chat", 0.0);
        hub.end_conversation(first, 1.0).unwrap();
        let second = hub.start_conversation(a, b, "chat again", 2.0);
        assert_ne!(first, second);
    }

    #[test]
    fn send_message_delivers_exactly_once_to_receiver_queue() {
        let mut hub = CommunicationHub::new();
        let sender = AgentId(0);
        let receiver = AgentId(1);
        hub.register_agent(sender);
        hub.register_agent(receiver);
        let id = hub.next_message_id();
        let message = Message::new(id, sender, receiver, "hi", MessageType::Greeting, None, None, None, None, false, 0.0, 0.0);
        hub.send_message(message, 0.0);

        let drained = hub.receive_messages(receiver, 1.0);
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].content, "hi");
        assert_eq!(drained[0].read_at, Some(1.0));

        let drained_again = hub.receive_messages(receiver, 2.0);
        assert!(drained_again.is_empty());
    }

    #[test]
    fn send_message_to_unregistered_receiver_is_a_delivery_no_op() {
        let mut hub = CommunicationHub::new();
        let sender = AgentId(0);
        hub.register_agent(sender);
        let id = hub.next_message_id();
        let message = Message::new(id, sender, AgentId(99), "hi", MessageType::Statement, None, None, None, None, false, 0.0, 0.0);
        let sent = hub.send_message(message, 0.0);
        assert_eq!(sent.delivered_at, Some(0.0));
        // No queue exists for 99, so nothing to drain, but send_message did not panic or error.
        assert!(hub.receive_messages(AgentId(99), 1.0).is_empty());
    }

    #[test]
    fn requires_response_moves_conversation_to_waiting_on_send() {
        let mut hub = CommunicationHub::new();
        let a = AgentId(0);
        let b = AgentId(1);
        hub.register_agent(a);
        hub.register_agent(b);
        let conv_id = hub.start_conversation(a, b, "chat", 0.0);
        let mid = hub.next_message_id();
        let message = Message::new(mid, a, b, "how are you?", MessageType::Question, Some(conv_id), None, None, None, true, 30.0, 1.0);
        hub.send_message(message, 1.0);
        let conv = hub.get_conversation(conv_id).unwrap();
        assert_eq!(conv.waiting_for_response_from, Some(b));
        assert_eq!(conv.expected_response_by, Some(31.0));
    }

    #[test]
    fn broadcast_reaches_every_registered_agent_but_the_sender() {
        let mut hub = CommunicationHub::new();
        let sender = AgentId(0);
        hub.register_agent(sender);
        hub.register_agent(AgentId(1));
        hub.register_agent(AgentId(2));
        let sent = hub.broadcast_message(sender, "hello all", None, 0.0);
        assert_eq!(sent.len(), 2);

        let r1 = hub.receive_messages(AgentId(1), 1.0);
        let r2 = hub.receive_messages(AgentId(2), 1.0);
        assert_eq!(r1.len(), 1);
        assert_eq!(r2.len(), 1);

        let sender_inbox = hub.receive_messages(sender, 1.0);
        assert!(sender_inbox.is_empty());
    }

    #[test]
    fn get_agent_active_conversations_excludes_ended() {
        let mut hub = CommunicationHub::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let c = AgentId(2);
        let conv_ab = hub.start_conversation(a, b, "chat", 0.0);
        hub.start_conversation(a, c, "other chat", 0.0);
        hub.end_conversation(conv_ab, 1.0).unwrap();

        let active = hub.get_agent_active_conversations(a);
        assert_eq!(active.len(), 1);
        assert!(active[0].has_participant(c));
    }

    #[test]
    fn sweep_timed_out_flips_waiting_past_deadline() {
        let mut hub = CommunicationHub::new();
        let a = AgentId(0);
        let b = AgentId(1);
        let conv_id = hub.start_conversation(a, b, "chat", 0.0);
        let mid = hub.next_message_id();
        let message = Message::new(mid, a, b, "?", MessageType::Question, Some(conv_id), None, None, None, true, 10.0, 0.0);
        hub.send_message(message, 0.0);
        hub.sweep_timed_out(20.0);
        assert_eq!(
            hub.get_conversation(conv_id).unwrap().status,
            crate::conversation::ConversationStatus::TimedOut
        );
    }
}
