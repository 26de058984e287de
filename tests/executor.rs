mod common;

use chrono::{Duration as ChronoDuration, Utc};
use common::*;
use meme_swap_agent::{
    errors::{ExecutionStage, RejectionReason, SubmissionError, TradeError, TradeErrorKind},
    network::RetryConfig,
    types::{ExecutionUrgency, TradeConfig, TradeEvent, TradeParams},
};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::time::Duration;

fn buy(amount: rust_decimal::Decimal) -> TradeParams {
    TradeParams::market("SOL", "BONK", amount)
}

#[tokio::test]
async fn executes_a_valid_route() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling(),
    );
    let mut events = h.executor.events().subscribe();

    let result = h.executor.execute_trade(buy(dec!(100))).await.unwrap();

    assert_eq!(result.input_amount, dec!(100));
    assert_eq!(result.output_amount, dec!(50000));
    assert_eq!(result.execution_price, dec!(500));
    assert_eq!(result.slippage, dec!(0));
    assert_eq!(result.price_impact, dec!(0.005));
    assert_eq!(result.attempts, 1);
    assert_eq!(result.hops, vec!["Raydium".to_string()]);

    let history = h.executor.history().list().await;
    assert_eq!(history, vec![result.clone()]);

    match events.recv().await.unwrap() {
        TradeEvent::TradeExecuted(published) => assert_eq!(published, result),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn realized_slippage_is_measured_against_the_quote() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().then(Ok(dec!(49900))),
    );

    let result = h.executor.execute_trade(buy(dec!(100))).await.unwrap();
    assert_eq!(result.slippage, dec!(0.002));
    assert_eq!(result.execution_price, dec!(499));
}

#[tokio::test]
async fn empty_candidates_mean_no_route() {
    let h = Harness::new(ScriptedRoutes::always(vec![]), ScriptedSubmitter::filling());

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    assert!(matches!(err, TradeError::NoRoute { detail: None, .. }));
    assert_eq!(h.submitter.calls(), 0);
    assert!(h.executor.history().is_empty().await);
}

#[tokio::test]
async fn provider_failure_is_reported_as_no_route_with_detail() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![]).then(Err(anyhow::anyhow!("aggregator unreachable"))),
        ScriptedSubmitter::filling(),
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    match err {
        TradeError::NoRoute { detail: Some(detail), .. } => assert!(detail.contains("aggregator unreachable")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn excessive_impact_is_rejected_before_submission() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.02))]),
        ScriptedSubmitter::filling(),
    );
    let mut events = h.executor.events().subscribe();

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    assert!(matches!(err, TradeError::RouteRejected(RejectionReason::PriceImpact { .. })));
    assert_eq!(h.submitter.calls(), 0);
    assert!(h.executor.history().is_empty().await);

    match events.recv().await.unwrap() {
        TradeEvent::TradeFailed { kind, .. } => assert_eq!(kind, TradeErrorKind::RouteRejected),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn only_the_top_candidate_is_considered() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![
            route(dec!(100), dec!(50000), dec!(0.02)),
            route(dec!(100), dec!(49000), dec!(0.001)),
        ]),
        ScriptedSubmitter::filling(),
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    assert!(matches!(err, TradeError::RouteRejected(_)));
}

#[tokio::test]
async fn limit_orders_reject_worse_quotes() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling(),
    );

    let params = TradeParams::limit("SOL", "BONK", dec!(100), dec!(600));
    let err = h.executor.execute_trade(params).await.unwrap_err();
    assert!(matches!(err, TradeError::RouteRejected(RejectionReason::LimitPrice { .. })));

    let params = TradeParams::limit("SOL", "BONK", dec!(100), dec!(450));
    assert!(h.executor.execute_trade(params).await.is_ok());
}

#[tokio::test]
async fn invalid_params_never_reach_the_provider() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling(),
    );

    let err = h.executor.execute_trade(buy(dec!(0))).await.unwrap_err();
    assert!(matches!(err, TradeError::InvalidParams(_)));
    assert_eq!(h.routes.calls(), 0);
}

#[tokio::test]
async fn transient_failures_are_retried_with_the_same_route() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().fail_times(2, SubmissionError::Network("rpc reset".to_string())),
    );

    let result = h.executor.execute_trade(buy(dec!(100))).await.unwrap();
    assert_eq!(result.attempts, 3);
    assert_eq!(h.submitter.calls(), 3);
    assert_eq!(h.routes.calls(), 1);
    assert_eq!(h.executor.history().len().await, 1);
}

#[tokio::test]
async fn retries_stop_at_the_configured_attempts() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().fail_times(5, SubmissionError::Network("rpc reset".to_string())),
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    match err {
        TradeError::ExecutionFailed { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(source, SubmissionError::Network(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(h.submitter.calls(), 3);
    assert!(h.executor.history().is_empty().await);
}

#[tokio::test]
async fn rejected_transactions_are_not_retried() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().then(Err(SubmissionError::Rejected("blockhash not found".to_string()))),
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    assert!(matches!(err, TradeError::ExecutionFailed { attempts: 1, .. }));
    assert_eq!(h.submitter.calls(), 1);
}

#[tokio::test]
async fn zero_output_receipts_fail_without_recording() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().then(Ok(dec!(0))),
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    match err {
        TradeError::ExecutionFailed { attempts, source } => {
            assert_eq!(attempts, 1);
            assert!(matches!(source, SubmissionError::InvalidReceipt(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(h.submitter.calls(), 1);
    assert!(h.executor.history().is_empty().await);
}

#[tokio::test]
async fn expired_routes_are_requoted_before_submission() {
    let mut stale = route(dec!(100), dec!(50000), dec!(0.005));
    stale.expires_at = Some(Utc::now() - ChronoDuration::seconds(1));

    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(48000), dec!(0.005))]).then(Ok(vec![stale])),
        ScriptedSubmitter::filling(),
    );

    let result = h.executor.execute_trade(buy(dec!(100))).await.unwrap();
    assert_eq!(h.routes.calls(), 2);
    assert_eq!(result.output_amount, dec!(48000));
}

#[tokio::test]
async fn requoted_routes_are_validated_again() {
    let mut stale = route(dec!(100), dec!(50000), dec!(0.005));
    stale.expires_at = Some(Utc::now() - ChronoDuration::seconds(1));

    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.2))]).then(Ok(vec![stale])),
        ScriptedSubmitter::filling(),
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    assert!(matches!(err, TradeError::RouteRejected(RejectionReason::PriceImpact { .. })));
    assert_eq!(h.submitter.calls(), 0);
}

#[tokio::test]
async fn past_deadline_fails_before_quoting() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling(),
    );

    let params = buy(dec!(100)).with_deadline(Utc::now() - ChronoDuration::seconds(1));
    let err = h.executor.execute_trade(params).await.unwrap_err();
    assert!(matches!(err, TradeError::DeadlineExceeded { stage: ExecutionStage::Quote }));
    assert_eq!(h.routes.calls(), 0);
}

#[tokio::test]
async fn in_flight_submission_outlives_the_deadline() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().with_delay(Duration::from_millis(400)),
    );

    let params = buy(dec!(100)).with_deadline(Utc::now() + ChronoDuration::milliseconds(200));
    let result = h.executor.execute_trade(params).await.unwrap();
    assert_eq!(result.attempts, 1);
    assert_eq!(h.submitter.calls(), 1);
    assert_eq!(h.executor.history().list().await, vec![result]);
}

#[tokio::test]
async fn no_new_attempt_starts_after_the_deadline() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling()
            .with_delay(Duration::from_millis(400))
            .then(Err(SubmissionError::Network("rpc reset".to_string()))),
    );

    let params = buy(dec!(100)).with_deadline(Utc::now() + ChronoDuration::milliseconds(200));
    let err = h.executor.execute_trade(params).await.unwrap_err();
    assert!(matches!(err, TradeError::DeadlineExceeded { .. }));
    assert_eq!(h.submitter.calls(), 1);
    assert!(h.executor.history().is_empty().await);
}

#[tokio::test]
async fn backoff_that_would_outlive_the_deadline_gives_up() {
    let mut settings = fast_settings();
    settings.backoff = RetryConfig {
        max_attempts: 3,
        initial_delay_ms: 5_000,
        max_delay_ms: 10_000,
        exponential_base: 2.0,
    };
    let h = Harness::with(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().then(Err(SubmissionError::Network("rpc reset".to_string()))),
        TradeConfig::default(),
        settings,
    );

    let params = buy(dec!(100)).with_deadline(Utc::now() + ChronoDuration::seconds(1));
    let err = h.executor.execute_trade(params).await.unwrap_err();
    assert!(matches!(err, TradeError::DeadlineExceeded { stage: ExecutionStage::Backoff }));
    assert_eq!(h.submitter.calls(), 1);
}

#[tokio::test]
async fn per_attempt_timeout_counts_as_transient() {
    let mut settings = fast_settings();
    settings.submit_timeout = Duration::from_millis(20);
    let config = TradeConfig {
        retry_attempts: 2,
        ..TradeConfig::default()
    };
    let h = Harness::with(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling().with_delay(Duration::from_millis(200)),
        config,
        settings,
    );

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    match err {
        TradeError::ExecutionFailed { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(matches!(source, SubmissionError::Timeout(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(h.submitter.calls(), 2);
}

#[tokio::test]
async fn signer_context_carries_bundle_and_urgency() {
    let config = TradeConfig {
        use_priority_bundle: true,
        ..TradeConfig::default()
    };
    let h = Harness::with(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling(),
        config,
        fast_settings(),
    );

    h.executor
        .execute_trade(buy(dec!(100)).with_urgency(ExecutionUrgency::High))
        .await
        .unwrap();

    let signer = h.submitter.last_signer.lock().unwrap().unwrap();
    assert!(signer.use_priority_bundle);
    assert_eq!(signer.urgency, ExecutionUrgency::High);
    assert_eq!(signer.priority_fee_micro_lamports, 100_000);
}

#[tokio::test]
async fn explicit_envelope_overrides_the_default() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.02))]),
        ScriptedSubmitter::filling(),
    );
    let loose = TradeConfig {
        max_price_impact: dec!(0.05),
        ..TradeConfig::default()
    };

    assert!(h.executor.execute_trade_with(buy(dec!(100)), &loose).await.is_ok());
    assert!(h.executor.execute_trade(buy(dec!(100))).await.is_err());

    h.executor.set_default_config(loose).await.unwrap();
    assert!(h.executor.execute_trade(buy(dec!(100))).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_trades_are_all_recorded() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling(),
    );

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..40 {
        let executor = h.executor.clone();
        tasks.spawn(async move { executor.execute_trade(buy(dec!(100))).await });
    }
    while let Some(joined) = tasks.join_next().await {
        assert!(joined.unwrap().is_ok());
    }

    let history = h.executor.history().list().await;
    assert_eq!(history.len(), 40);
    let ids: HashSet<_> = history.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids.len(), 40);
}

#[tokio::test]
async fn running_trades_keep_the_envelope_they_started_with() {
    let h = Harness::new(
        ScriptedRoutes::always(vec![route(dec!(100), dec!(50000), dec!(0.005))]),
        ScriptedSubmitter::filling()
            .with_delay(Duration::from_millis(300))
            .fail_times(1, SubmissionError::Network("rpc reset".to_string())),
    );

    let executor = h.executor.clone();
    let running = tokio::spawn(async move { executor.execute_trade(buy(dec!(100))).await });

    while h.submitter.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let tight = TradeConfig {
        max_price_impact: dec!(0.001),
        retry_attempts: 1,
        ..TradeConfig::default()
    };
    h.executor.set_default_config(tight).await.unwrap();

    let result = running.await.unwrap().unwrap();
    assert_eq!(result.attempts, 2);

    let err = h.executor.execute_trade(buy(dec!(100))).await.unwrap_err();
    assert!(matches!(err, TradeError::RouteRejected(RejectionReason::PriceImpact { .. })));
}
