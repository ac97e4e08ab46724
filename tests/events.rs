mod common;

use hexclaim::{events::GameEvent, world::FactionId};
use tokio_stream::StreamExt;

#[tokio::test]
async fn subscribers_see_events_in_publish_order() {
    let players = "  - controller: human\n";
    let mut state = common::state(&common::plains(3, 3), players);
    let mut stream = state.events().stream();
    let mut engine = common::engine();
    engine.start(&mut state).expect("round starts");

    let mut received = Vec::new();
    for _ in 0..3 {
        let event = stream
            .next()
            .await
            .expect("stream open")
            .expect("no lag");
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            GameEvent::RoundStarted { round: 1 },
            GameEvent::TurnStarted { faction: FactionId(0) },
            GameEvent::TurnEnded { faction: FactionId(0) },
        ]
    );
    assert_eq!(state.drain_events(), received);
}

#[test]
fn events_serialize_with_a_type_tag() {
    let event = GameEvent::UnitMoved {
        unit: hexclaim::world::UnitId(3),
        from: hexclaim::hex::HexId(10),
        to: hexclaim::hex::HexId(11),
    };
    let json = serde_json::to_value(&event).expect("serializes");
    assert_eq!(
        json,
        serde_json::json!({ "type": "unit-moved", "unit": 3, "from": 10, "to": 11 })
    );
}
