//! End-to-end connection request lifecycle through the API contract

use assert_matches::assert_matches;
use parlor_api::ApiClient;
use parlor_connections::RespondDecision;
use parlor_core::records::{ConnectionStatus, ConversationRecord};
use parlor_core::{records, Page, ParlorError, Paged};
use parlor_profile::BrowseFilter;
use parlor_testkit::TestNetwork;

#[tokio::test]
async fn request_accept_establishes_both_sides_and_a_conversation() {
    let network = TestNetwork::new();
    let (ada, ada_user) = network.onboarded("ada@example.com", "Ada").await.unwrap();
    let (bob, bob_user) = network.onboarded("bob@example.com", "Bob").await.unwrap();

    let request = ada
        .send_connection_request(bob_user.id, "Let's connect")
        .await
        .unwrap();
    assert_eq!(request.status, ConnectionStatus::Pending);

    // B's received list contains exactly one pending entry.
    let received = bob.received_requests(Page::first()).await.unwrap();
    assert_eq!(received.items.len(), 1);
    assert_eq!(received.items[0].request.status, ConnectionStatus::Pending);
    assert_eq!(received.items[0].request.message, "Let's connect");
    assert_eq!(received.items[0].sender_name, "Ada");

    let outcome = bob
        .respond_to_request(request.id, RespondDecision::Accept)
        .await
        .unwrap();
    let conversation = outcome.conversation.expect("accept creates a conversation");
    assert!(conversation.links(ada_user.id, bob_user.id));

    // A's sent list shows the accepted status.
    let sent = ada.sent_requests(Page::first()).await.unwrap();
    assert_eq!(sent.items[0].request.status, ConnectionStatus::Accepted);

    // Both established lists contain the pair.
    for client in [&ada, &bob] {
        let established = client.established_connections(Page::first()).await.unwrap();
        assert_eq!(established.items.len(), 1);
        assert!(established.items[0].request.links(ada_user.id, bob_user.id));
    }

    // Exactly one conversation exists for the pair.
    let all: Vec<ConversationRecord> =
        records::scan(network.effects(), ConversationRecord::KEY_PREFIX)
            .await
            .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn duplicates_are_refused_while_a_request_is_active() {
    let network = TestNetwork::new();
    let (ada, _) = network.onboarded("ada@example.com", "Ada").await.unwrap();
    let (bob, bob_user) = network.onboarded("bob@example.com", "Bob").await.unwrap();

    ada.send_connection_request(bob_user.id, "hello")
        .await
        .unwrap();

    let err = ada
        .send_connection_request(bob_user.id, "hello again")
        .await
        .unwrap_err();
    assert_matches!(err, ParlorError::DuplicateRequest { .. });

    // The reverse direction is blocked too.
    let me = ada.me().await.unwrap();
    let err = bob
        .send_connection_request(me.id, "right back")
        .await
        .unwrap_err();
    assert_matches!(err, ParlorError::DuplicateRequest { .. });
}

#[tokio::test]
async fn a_second_respond_observes_invalid_transition() {
    let network = TestNetwork::new();
    let (ada, _) = network.onboarded("ada@example.com", "Ada").await.unwrap();
    let (bob, bob_user) = network.onboarded("bob@example.com", "Bob").await.unwrap();

    let request = ada
        .send_connection_request(bob_user.id, "hello")
        .await
        .unwrap();

    bob.respond_to_request(request.id, RespondDecision::Accept)
        .await
        .unwrap();
    let err = bob
        .respond_to_request(request.id, RespondDecision::Reject)
        .await
        .unwrap_err();
    assert_matches!(err, ParlorError::InvalidTransition { .. });
}

#[tokio::test]
async fn only_the_receiver_may_respond_through_the_api() {
    let network = TestNetwork::new();
    let (ada, _) = network.onboarded("ada@example.com", "Ada").await.unwrap();
    let (_, bob_user) = network.onboarded("bob@example.com", "Bob").await.unwrap();

    let request = ada
        .send_connection_request(bob_user.id, "hello")
        .await
        .unwrap();

    // The sender trying to accept their own request is refused.
    let err = ada
        .respond_to_request(request.id, RespondDecision::Accept)
        .await
        .unwrap_err();
    assert_matches!(err, ParlorError::NotAuthorized { .. });
}

#[tokio::test]
async fn sending_a_request_hides_the_member_from_browse() {
    let network = TestNetwork::new();
    let (ada, _) = network.onboarded("ada@example.com", "Ada").await.unwrap();
    let (bob, bob_user) = network.onboarded("bob@example.com", "Bob").await.unwrap();
    network.onboarded("cleo@example.com", "Cleo").await.unwrap();

    let before = ada.browse(&BrowseFilter::default(), Page::first()).await.unwrap();
    assert_eq!(before.items.len(), 2);

    let request = ada
        .send_connection_request(bob_user.id, "hello")
        .await
        .unwrap();
    let after: Paged<_> = ada
        .browse(&BrowseFilter::default(), Page::first())
        .await
        .unwrap();
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.items[0].name, "Cleo");

    // A rejection puts Bob back on the shelf.
    bob.respond_to_request(request.id, RespondDecision::Reject)
        .await
        .unwrap();
    let restored = ada
        .browse(&BrowseFilter::default(), Page::first())
        .await
        .unwrap();
    assert_eq!(restored.items.len(), 2);
}

#[tokio::test]
async fn anonymous_clients_are_refused_everywhere() {
    let network = TestNetwork::new();
    let guest = network.client();

    assert_matches!(guest.me().await, Err(ParlorError::AuthRequired { .. }));
    assert_matches!(
        guest.received_requests(Page::first()).await,
        Err(ParlorError::AuthRequired { .. })
    );
    assert_matches!(
        guest.conversations(Page::first()).await,
        Err(ParlorError::AuthRequired { .. })
    );
}
