//! Property tests for the importer's self-weight bookkeeping: the
//! parent-decrement scheme must net out to consistent weights for every
//! well-formed trace, including overlapping same-frame siblings and
//! recursion.

use proptest::prelude::*;

use callweave_core::format::{EventedTrace, FrameDescriptor, SharedData, TraceEvent};
use callweave_core::import::{ImportError, import_evented};

const FRAME_COUNT: usize = 4;

/// One activation: a frame, some exclusive time before and after its
/// callees, and the callees themselves.
#[derive(Debug, Clone)]
struct Call {
    frame: usize,
    lead: u8,
    tail: u8,
    children: Vec<Call>,
}

fn call_strategy() -> impl Strategy<Value = Call> {
    let leaf = (0..FRAME_COUNT, 0u8..4, 0u8..4).prop_map(|(frame, lead, tail)| Call {
        frame,
        lead,
        tail,
        children: Vec::new(),
    });
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            0..FRAME_COUNT,
            0u8..4,
            0u8..4,
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(frame, lead, tail, children)| Call {
                frame,
                lead,
                tail,
                children,
            })
    })
}

fn forest_strategy() -> impl Strategy<Value = Vec<Call>> {
    prop::collection::vec(call_strategy(), 1..4)
}

fn emit(call: &Call, cursor: &mut f64, events: &mut Vec<TraceEvent>) {
    events.push(TraceEvent::Open {
        at: *cursor,
        frame: call.frame,
    });
    *cursor += f64::from(call.lead);
    for child in &call.children {
        emit(child, cursor, events);
    }
    *cursor += f64::from(call.tail);
    events.push(TraceEvent::Close {
        at: *cursor,
        frame: call.frame,
    });
}

fn trace_from(forest: &[Call]) -> EventedTrace {
    let mut events = Vec::new();
    let mut cursor = 0.0;
    for call in forest {
        emit(call, &mut cursor, &mut events);
    }
    EventedTrace {
        name: "generated".to_string(),
        profile_type: Some("evented".to_string()),
        start_value: 0.0,
        end_value: cursor,
        unit: "milliseconds".to_string(),
        events,
        shared: SharedData {
            frames: (0..FRAME_COUNT)
                .map(|i| FrameDescriptor {
                    name: format!("f{i}"),
                    file: None,
                    line: None,
                    col: None,
                })
                .collect(),
        },
    }
}

fn out_of_order_pair() -> impl Strategy<Value = (f64, f64)> {
    (1u32..1_000_000)
        .prop_flat_map(|open| (Just(open), 0..open))
        .prop_map(|(open, close)| (f64::from(open), f64::from(close)))
}

proptest! {
    #[test]
    fn weights_stay_consistent(forest in forest_strategy()) {
        let trace = trace_from(&forest);
        let result = import_evented(&trace);
        prop_assert!(result.is_ok(), "well-formed trace failed: {:?}", result.err());
        let profile = result.unwrap();

        let tree = profile.call_tree();
        for id in 0..tree.len() {
            let Some(node) = tree.node(id) else { continue };
            prop_assert!(node.self_weight >= 0.0, "self weight {} < 0", node.self_weight);
            prop_assert!(
                node.self_weight <= node.total_weight,
                "self {} exceeds total {}",
                node.self_weight,
                node.total_weight
            );
            let child_total: f64 = node
                .children
                .iter()
                .filter_map(|&child| tree.node(child))
                .map(|child| child.total_weight)
                .sum();
            prop_assert!(
                child_total <= node.total_weight,
                "children total {} exceeds parent total {}",
                child_total,
                node.total_weight
            );
        }

        prop_assert_eq!(profile.duration(), trace.end_value - trace.start_value);
    }

    #[test]
    fn traversal_visits_every_node_twice(forest in forest_strategy()) {
        let trace = trace_from(&forest);
        let result = import_evented(&trace);
        prop_assert!(result.is_ok(), "well-formed trace failed: {:?}", result.err());
        let profile = result.unwrap();

        let mut opens = 0usize;
        let mut closes = 0usize;
        profile.for_each(|_| opens += 1, |_| closes += 1);
        prop_assert_eq!(opens, profile.call_tree().len());
        prop_assert_eq!(closes, profile.call_tree().len());
    }

    #[test]
    fn dropping_the_final_close_unbalances(forest in forest_strategy()) {
        let mut trace = trace_from(&forest);
        trace.events.pop();
        prop_assert_eq!(import_evented(&trace).err(), Some(ImportError::UnbalancedStack));
    }

    #[test]
    fn negative_delta_always_fails((open_at, close_at) in out_of_order_pair()) {
        let trace = EventedTrace {
            name: "generated".to_string(),
            profile_type: Some("evented".to_string()),
            start_value: 0.0,
            end_value: open_at,
            unit: "milliseconds".to_string(),
            events: vec![
                TraceEvent::Open { at: open_at, frame: 0 },
                TraceEvent::Close { at: close_at, frame: 0 },
            ],
            shared: SharedData {
                frames: vec![FrameDescriptor {
                    name: "f0".to_string(),
                    file: None,
                    line: None,
                    col: None,
                }],
            },
        };
        prop_assert_eq!(import_evented(&trace).err(), Some(ImportError::OutOfOrder));
    }
}
