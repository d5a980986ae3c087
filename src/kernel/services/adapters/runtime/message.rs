use crate::kernel::commands::{Dispatched, NodeAction};
use crate::kernel::services::ports::CommandSpec;
use crate::kernel::tree::{NodeKey, TreeNode};

#[derive(Debug)]
pub enum AppMessage {
    ChildrenLoaded {
        key: NodeKey,
        children: Vec<TreeNode>,
    },
    ActionFinished {
        target: String,
        action: NodeAction,
        result: Result<Dispatched, String>,
    },
    /// One line of output from a running compose/docker command.
    Output(String),
    /// The terminal must be handed to this command (attach / shell).
    Interactive(CommandSpec),
}
