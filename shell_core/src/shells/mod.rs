//! # Shells and Capabilities
//!
//! Components are built from a closed set of capability traits rather than a
//! base-class hierarchy. A concrete shell implements the capabilities it has,
//! names them in its [`Typed`] lineage for tag-based checks, and exposes them
//! through the [`Component`] accessors for typed access.
//!
//! ```text
//!              Resizable
//!             /         \
//!   TopLevelShell      ListView      Colorable
//!      |      \         /               |
//!  MainFrame  ProjectBrowser        OutputLog ── TopLevelShell
//! ```
//!
//! Top-level shells are singletons by convention. [`ShellKind`] enumerates
//! them so [`find_shell`] can match exhaustively.

mod main_frame;
mod output_log;
mod project_browser;

pub use main_frame::MainFrame;
pub use output_log::{append_to_output_log, OutputLog};
pub use project_browser::ProjectBrowser;

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::registry::InstanceRegistry;
use crate::types::{register_type, Identify, Lineage, TypeTag, Typed};

/// Width and height in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

// ============================================================================
// Capabilities
// ============================================================================

pub trait Resizable {
    fn size(&self) -> Size;
    fn resize(&self, size: Size);
}

pub trait Colorable {
    fn background(&self) -> Rgb;
    fn set_background(&self, color: Rgb);
}

/// An independently windowed component, at most one live per kind.
pub trait TopLevelShell: Resizable {
    fn kind(&self) -> ShellKind;
    fn title(&self) -> String;
}

/// A component presenting a selectable list of rows.
pub trait ListView: Resizable {
    fn items(&self) -> Vec<String>;
    fn selected(&self) -> Option<usize>;
    /// Select row `index`. Returns false when out of range.
    fn select(&self, index: usize) -> bool;
}

impl Typed for dyn Resizable {}

impl Typed for dyn Colorable {}

impl Typed for dyn TopLevelShell {
    fn declare(lineage: &mut Lineage) {
        lineage.inherits::<dyn Resizable>();
    }
}

impl Typed for dyn ListView {
    fn declare(lineage: &mut Lineage) {
        lineage.inherits::<dyn Resizable>();
    }
}

/// Typed access to the capabilities a component implements.
pub trait Component: Identify {
    fn as_resizable(&self) -> Option<&dyn Resizable> {
        None
    }

    fn as_colorable(&self) -> Option<&dyn Colorable> {
        None
    }

    fn as_top_level(&self) -> Option<&dyn TopLevelShell> {
        None
    }

    fn as_list_view(&self) -> Option<&dyn ListView> {
        None
    }
}

// ============================================================================
// Singleton kinds
// ============================================================================

/// Every top-level shell type that may be looked up by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellKind {
    MainFrame,
    OutputLog,
    ProjectBrowser,
}

impl ShellKind {
    pub const ALL: [ShellKind; 3] = [ShellKind::MainFrame, ShellKind::OutputLog, ShellKind::ProjectBrowser];

    /// Registry tag of the concrete type behind this kind
    pub fn tag(&self) -> TypeTag {
        match self {
            ShellKind::MainFrame => register_type::<MainFrame>(),
            ShellKind::OutputLog => register_type::<OutputLog>(),
            ShellKind::ProjectBrowser => register_type::<ProjectBrowser>(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShellKind::MainFrame => "Main Frame",
            ShellKind::OutputLog => "Output Log",
            ShellKind::ProjectBrowser => "Project Browser",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A live top-level shell, resolved by kind.
#[derive(Clone)]
pub enum ShellRef {
    MainFrame(Rc<MainFrame>),
    OutputLog(Rc<OutputLog>),
    ProjectBrowser(Rc<ProjectBrowser>),
}

impl ShellRef {
    pub fn kind(&self) -> ShellKind {
        match self {
            ShellRef::MainFrame(_) => ShellKind::MainFrame,
            ShellRef::OutputLog(_) => ShellKind::OutputLog,
            ShellRef::ProjectBrowser(_) => ShellKind::ProjectBrowser,
        }
    }

    pub fn as_component(&self) -> &dyn Component {
        match self {
            ShellRef::MainFrame(shell) => &**shell,
            ShellRef::OutputLog(shell) => &**shell,
            ShellRef::ProjectBrowser(shell) => &**shell,
        }
    }

    pub fn as_top_level(&self) -> &dyn TopLevelShell {
        match self {
            ShellRef::MainFrame(shell) => &**shell,
            ShellRef::OutputLog(shell) => &**shell,
            ShellRef::ProjectBrowser(shell) => &**shell,
        }
    }
}

impl fmt::Debug for ShellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShellRef").field(&self.kind()).finish()
    }
}

/// The live shell of `kind`, if one is registered.
pub fn find_shell(registry: &InstanceRegistry, kind: ShellKind) -> Option<ShellRef> {
    match kind {
        ShellKind::MainFrame => registry.instance::<MainFrame>().map(ShellRef::MainFrame),
        ShellKind::OutputLog => registry.instance::<OutputLog>().map(ShellRef::OutputLog),
        ShellKind::ProjectBrowser => registry.instance::<ProjectBrowser>().map(ShellRef::ProjectBrowser),
    }
}

/// Every live shell, in [`ShellKind::ALL`] order.
pub fn open_shells(registry: &InstanceRegistry) -> Vec<ShellRef> {
    ShellKind::ALL
        .iter()
        .filter_map(|kind| find_shell(registry, *kind))
        .collect()
}
