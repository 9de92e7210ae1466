use crate::types::EvalResult;
use anyhow::Result;

/// Helper to assert the pass rate over gated cases meets a threshold.
///
/// Use this in your `#[tokio::test]` functions.
///
/// # Example
/// ```ignore
/// #[tokio::test]
/// async fn test_storefront_suite() -> Result<()> {
///     let eval = Eval::builder()
///         .dataset(dataset)
///         .rollout(rollout)
///         .rule(rule)
///         .passed_threshold(Some(0.9))
///         .build()?;
///
///     let result = eval.run().await?;
///     assert_eval_pass_rate(&result, 0.9)?;
///     Ok(())
/// }
/// ```
pub fn assert_eval_pass_rate(result: &EvalResult, min_pass_rate: f64) -> Result<()> {
    if result.summary.pass_rate < min_pass_rate {
        anyhow::bail!(
            "Evaluation failed: pass rate {:.1}% is below threshold {:.1}%\n{}",
            result.summary.pass_rate * 100.0,
            min_pass_rate * 100.0,
            result.summary_table()
        );
    }
    Ok(())
}

/// Helper to assert no gated case failed.
pub fn assert_eval_no_failures(result: &EvalResult) -> Result<()> {
    if result.summary.failed > 0 {
        anyhow::bail!(
            "Evaluation failed: {} of {} gated cases below threshold\n{}",
            result.summary.failed,
            result.summary.passed + result.summary.failed,
            result.summary_table()
        );
    }
    Ok(())
}

/// Helper to assert average score meets a threshold.
pub fn assert_eval_avg_score(result: &EvalResult, min_avg_score: f64) -> Result<()> {
    if result.summary.avg_score < min_avg_score {
        anyhow::bail!(
            "Evaluation failed: avg score {:.3} is below threshold {:.3}\n{}",
            result.summary.avg_score,
            min_avg_score,
            result.summary_table()
        );
    }
    Ok(())
}
