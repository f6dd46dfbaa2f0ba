mod action_queue;
mod actions;
mod event_loop;

pub use action_queue::{channel, Action, ActionRx, ActionTx};
pub use event_loop::{run_actions, RunSummary};
