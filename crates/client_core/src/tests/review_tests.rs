use super::*;

use crate::{error::FlowErrorKind, test_support::FakeProfileApi};

fn review_flow() -> (ReviewFlow, Arc<FakeProfileApi>) {
    let api = Arc::new(FakeProfileApi::default());
    (ReviewFlow::new(ProfileId(7), api.clone()), api)
}

fn fill_form(flow: &mut ReviewFlow) {
    let draft = flow.draft_mut();
    draft.author_name = "Ирина".to_string();
    draft.author_phone = " +79140000000 ".to_string();
    draft.text = "Отличная съёмка".to_string();
    draft.rating = 4;
}

#[test]
fn fresh_form_defaults_to_top_rating() {
    let (flow, _api) = review_flow();
    assert_eq!(flow.step(), ReviewStep::Form);
    assert_eq!(flow.draft().rating, MAX_RATING);
}

#[test]
fn empty_form_lists_every_missing_field() {
    let (mut flow, _api) = review_flow();
    match flow.submit_form() {
        Err(FlowError::MissingFields { fields }) => {
            assert_eq!(fields, vec!["author_name", "author_phone", "review_text"]);
        }
        other => panic!("expected missing fields, got {other:?}"),
    }
    assert_eq!(flow.step(), ReviewStep::Form);
}

#[test]
fn rating_outside_one_to_five_is_rejected() {
    let (mut flow, _api) = review_flow();
    fill_form(&mut flow);
    for rating in [0, 6] {
        flow.draft_mut().rating = rating;
        let err = flow.submit_form().expect_err("out of range");
        assert!(matches!(err, FlowError::RatingOutOfRange(r) if r == rating));
        assert_eq!(err.kind(), FlowErrorKind::Validation);
        assert_eq!(flow.step(), ReviewStep::Form);
    }
}

#[tokio::test]
async fn wrong_code_never_posts() {
    let (mut flow, api) = review_flow();
    fill_form(&mut flow);
    flow.submit_form().expect("form");
    assert_eq!(flow.step(), ReviewStep::Verify);

    flow.enter_code("0000").expect("enter");
    let err = flow.submit_code().await.expect_err("mismatch");
    assert_eq!(err.kind(), FlowErrorKind::Verification);
    assert_eq!(flow.step(), ReviewStep::Verify);
    assert!(api.reviews.lock().await.is_empty());
}

#[tokio::test]
async fn correct_code_posts_trimmed_review_and_closes() {
    let (mut flow, api) = review_flow();
    let mut events = flow.subscribe_events();
    fill_form(&mut flow);
    flow.submit_form().expect("form");
    assert_eq!(
        events.try_recv().expect("code sent"),
        FlowEvent::CodeSent {
            phone: "+79140000000".to_string()
        }
    );

    flow.enter_code("1234").expect("enter");
    let record = flow.submit_code().await.expect("published");
    assert_eq!(record.model_id, ProfileId(7));
    assert_eq!(record.rating, 4);

    let posted = api.reviews.lock().await;
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].author_phone, "+79140000000");
    assert_eq!(posted[0].review_text, "Отличная съёмка");

    assert_eq!(flow.step(), ReviewStep::Closed);
    assert_eq!(flow.draft(), &ReviewDraft::default());
    assert_eq!(
        events.try_recv().expect("published event"),
        FlowEvent::ReviewPublished { id: record.id }
    );
    assert_eq!(events.try_recv().expect("closed"), FlowEvent::Closed);
}

#[tokio::test]
async fn failed_post_stays_in_verify_for_retry() {
    let (mut flow, api) = review_flow();
    fill_form(&mut flow);
    flow.submit_form().expect("form");
    flow.enter_code("1234").expect("enter");
    let before = flow.draft().clone();

    api.fail_next("HTTP 502").await;
    let err = flow.submit_code().await.expect_err("server down");
    assert_eq!(err.kind(), FlowErrorKind::Submission);
    assert_eq!(flow.step(), ReviewStep::Verify);
    assert_eq!(flow.draft(), &before);

    flow.submit_code().await.expect("retry");
    assert_eq!(api.reviews.lock().await.len(), 2);
    assert_eq!(flow.step(), ReviewStep::Closed);
}

#[test]
fn cancel_discards_form() {
    let (mut flow, _api) = review_flow();
    fill_form(&mut flow);
    flow.submit_form().expect("form");

    flow.cancel();
    assert_eq!(flow.step(), ReviewStep::Closed);
    assert_eq!(flow.draft(), &ReviewDraft::default());
    assert!(matches!(
        flow.enter_code("1234"),
        Err(FlowError::InvalidStep { .. })
    ));
}
