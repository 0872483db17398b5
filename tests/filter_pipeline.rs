//! Integration tests for lazy filter-chain iteration and the multi-filter.

mod common;

use common::{spy, strings, Expand, Suffix};
use stagehand::pipeline::{
    filter_data, Data, FilterPipelineIterator, FilterStage, MultiFilter, Session, StreamFilter,
};
use stagehand::plugin::{InputConsumer, OutputProducer, ANY};

fn collect(data: Data<String>, filters: &mut [FilterStage<String>], session: &Session) -> Vec<String> {
    filter_data(data, filters, session)
        .map(|output| output.unwrap())
        .flat_map(Data::into_vec)
        .collect()
}

fn item(value: &str) -> Data<String> {
    Data::Item(value.to_string())
}

// =============================================================================
// BASIC CHAINS
// =============================================================================

#[test]
fn no_filters_yields_input_once() {
    let session = Session::default();
    let mut filters: Vec<FilterStage<String>> = Vec::new();
    let mut iter = FilterPipelineIterator::new(item("a"), &mut filters, &session);

    assert_eq!(iter.try_next().unwrap(), Some(item("a")));
    assert_eq!(iter.try_next().unwrap(), None);
    assert!(iter.is_finished());
}

#[test]
fn pass_through_filter_yields_item_once() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![FilterStage::batch(Suffix::new("same", "", &log))];

    assert_eq!(collect(item("a"), &mut filters, &session), strings(&["a"]));
}

#[test]
fn batch_filters_apply_in_order() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![
        FilterStage::batch(Suffix::new("x", "-x", &log)),
        FilterStage::batch(Suffix::new("y", "-y", &log)),
    ];

    assert_eq!(collect(item("a"), &mut filters, &session), strings(&["a-x-y"]));
}

#[test]
fn dropped_item_produces_nothing() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![
        FilterStage::batch(Suffix::new("drop", "", &log).dropping("a")),
        FilterStage::batch(Suffix::new("y", "-y", &log)),
    ];

    assert!(collect(item("a"), &mut filters, &session).is_empty());
    // the chain still handles the next input
    assert_eq!(collect(item("b"), &mut filters, &session), strings(&["b-y"]));
}

// =============================================================================
// STREAMING FILTERS
// =============================================================================

#[test]
fn streaming_filter_yields_each_buffered_item_in_order() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![FilterStage::stream(Expand::new("expand", 3, &log))];

    assert_eq!(collect(item("a"), &mut filters, &session), strings(&["a1", "a2", "a3"]));
}

#[test]
fn nested_streaming_filters_expand_depth_first() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![
        FilterStage::stream(Expand::new("outer", 2, &log)),
        FilterStage::stream(Expand::new("inner", 2, &log)),
    ];

    assert_eq!(
        collect(item("b"), &mut filters, &session),
        strings(&["b11", "b12", "b21", "b22"])
    );
}

#[test]
fn pending_output_survives_downstream_drop() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![
        FilterStage::stream(Expand::new("expand", 3, &log)),
        FilterStage::batch(Suffix::new("drop", "!", &log).dropping("a2")),
    ];

    assert_eq!(collect(item("a"), &mut filters, &session), strings(&["a1!", "a3!"]));
}

#[test]
fn pending_output_survives_dropped_first_item() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![
        FilterStage::stream(Expand::new("expand", 2, &log)),
        FilterStage::batch(Suffix::new("drop", "", &log).dropping("a1")),
        FilterStage::stream(Expand::new("again", 2, &log)),
    ];

    assert_eq!(collect(item("a"), &mut filters, &session), strings(&["a21", "a22"]));
}

#[test]
fn batch_input_is_processed_item_by_item() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![FilterStage::batch(Suffix::new("x", "-x", &log))];

    let out = collect(
        Data::Batch(strings(&["a", "b", "c"])),
        &mut filters,
        &session,
    );
    assert_eq!(out, strings(&["a-x", "b-x", "c-x"]));
}

#[test]
fn list_input_filter_receives_whole_batch() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![FilterStage::batch(Suffix::new("list", "", &log).with_list_input())];

    let out = collect(Data::Batch(strings(&["a", "b"])), &mut filters, &session);
    assert_eq!(out, strings(&["a", "b"]));
    assert_eq!(log.lock().as_slice(), &["list got 2".to_string()]);
}

// =============================================================================
// STOP AND ERRORS
// =============================================================================

#[test]
fn stop_request_ends_iteration() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![FilterStage::stream(Expand::new("expand", 5, &log))];
    let mut iter = filter_data(item("a"), &mut filters, &session);

    assert_eq!(iter.try_next().unwrap(), Some(item("a1")));
    session.stop();
    assert_eq!(iter.try_next().unwrap(), None);
    assert!(iter.is_finished());
}

#[test]
fn error_ends_iteration() {
    let log = spy();
    let session = Session::default();
    let mut filters = vec![
        FilterStage::stream(Expand::new("expand", 3, &log)),
        FilterStage::batch(Suffix::new("fail", "", &log).failing_on("a2")),
    ];
    let mut iter = filter_data(item("a"), &mut filters, &session);

    assert_eq!(iter.next().unwrap().unwrap(), item("a1"));
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
}

// =============================================================================
// MULTI FILTER
// =============================================================================

#[test]
fn multi_filter_runs_inner_chain() {
    let log = spy();
    let session = Session::default();
    let mut multi = MultiFilter::new(vec![
        FilterStage::stream(Expand::new("expand", 2, &log)),
        FilterStage::batch(Suffix::new("x", "-x", &log)),
    ]);

    multi.process_stream(item("a"), &session).unwrap();
    assert_eq!(multi.output(), Some(item("a1-x")));
    assert_eq!(multi.output(), Some(item("a2-x")));
    assert!(!multi.has_output());
}

#[test]
fn multi_filter_nests_inside_a_chain() {
    let log = spy();
    let session = Session::default();
    let multi = MultiFilter::new(vec![
        FilterStage::stream(Expand::new("inner", 2, &log)),
        FilterStage::batch(Suffix::new("x", "-x", &log)),
    ]);
    let mut filters = vec![
        FilterStage::stream(Expand::new("outer", 2, &log)),
        FilterStage::stream(multi),
    ];

    assert_eq!(
        collect(item("b"), &mut filters, &session),
        strings(&["b11-x", "b12-x", "b21-x", "b22-x"])
    );
}

#[test]
fn multi_filter_types_come_from_ends() {
    let empty: MultiFilter<String> = MultiFilter::new(Vec::new());
    assert!(empty.accepts().is_empty());
    assert!(empty.generates().is_empty());

    let log = spy();
    let multi = MultiFilter::new(vec![FilterStage::batch(Suffix::new("x", "", &log))]);
    assert_eq!(multi.accepts(), vec![ANY]);
    assert_eq!(multi.generates(), vec![ANY]);
}

#[test]
fn multi_filter_finalizes_every_inner_filter() {
    let log = spy();
    let session = Session::default();
    let mut multi = MultiFilter::new(vec![
        FilterStage::stream(Expand::new("a", 1, &log)),
        FilterStage::batch(Suffix::new("b", "", &log)),
    ]);

    StreamFilter::initialize(&mut multi, &session).unwrap();
    StreamFilter::finalize(&mut multi, &session).unwrap();
    let events = log.lock().clone();
    assert_eq!(events, strings(&["init b", "finalize a", "finalize b"]));
}
