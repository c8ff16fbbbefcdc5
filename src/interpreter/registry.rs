/// The function and operator table.
///
/// # Responsibilities
/// - Maps tag names to function handlers and operator names to operator
///   handlers.
/// - Holds autoload descriptors and resolves them into handlers on first
///   use, rewriting every slot a descriptor served.
/// - Answers whether a tag owns children, consulting static child flags
///   before the handler.
/// - Keeps the set of literal tag names.
pub mod core;

/// Autoload descriptors.
///
/// Describes handlers that are created on first use through a named loader,
/// and the configuration form they are declared in.
pub mod descriptor;

/// Handler traits.
///
/// Defines the interfaces function tags and operators implement, and the
/// loader factories that create them.
pub mod handler;

pub use self::{
    core::Registry,
    descriptor::{AutoloadDefinition, AutoloadDescriptor, Loader},
    handler::{Factory, FunctionCall, FunctionHandler, Handler, OperatorHandler},
};
