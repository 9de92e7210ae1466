//! storeval-core: transcript evaluation engine for storefront agent evals.
//! Flatten datasets into scenario rows, obtain transcripts via a rollout,
//! and grade each final answer with composable scoring rules.

pub mod config;
pub mod dataset;
pub mod normalize;
pub mod rollout;
pub mod rule;
pub mod runner;
pub mod table;
pub mod testing;
pub mod transcript;
pub mod types;

pub mod rules {
    pub mod abstention;
    pub mod inspect;
    pub mod leakage;
    pub mod range_gate;
    pub mod table_set;
    pub mod weighted;
}

pub use config::{EvalConfig, RuleConfig};
pub use dataset::{flatten, DatasetError, DatasetInput, ScenarioRecord};
pub use normalize::normalize;
pub use rollout::{from_async_fn, Rollout};
pub use rule::Rule;
pub use rules::{
    abstention::ToolAbstentionRule,
    inspect::InspectRule,
    leakage::LeakageRule,
    range_gate::{FieldPredicate, TableRangeRule},
    table_set::{RowIdentity, TableSetRule},
    weighted::WeightedContainsRule,
};
pub use runner::{Eval, EvalBuilder};
pub use table::{find_table, has_table, ParsedTable, TableMode, TableRow};
pub use transcript::{
    any_tool_call_occurred, last_assistant_content, last_tool_content_before_final_assistant,
    Message, Role, Transcript,
};
pub use types::{CaseOutcome, EvalResult, EvalSummary, ScenarioRow, ScoreResult};
