//! Main application frame.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::callback::Callback;
use crate::errors::ShellResult;
use crate::registry::{InstanceRegistry, Registration};
use crate::types::{Lineage, Typed};

use super::{append_to_output_log, Component, Resizable, ShellKind, Size, TopLevelShell};

pub struct MainFrame {
    title: RefCell<String>,
    status: RefCell<String>,
    size: Cell<Size>,
    registry: Weak<InstanceRegistry>,
    status_changed: RefCell<Callback<str>>,
    resized: RefCell<Callback<(u32, u32)>>,
    closed: RefCell<Callback<()>>,
    _registration: Registration,
}

impl MainFrame {
    pub const DEFAULT_SIZE: Size = Size::new(1280, 800);

    pub fn new(registry: &Rc<InstanceRegistry>, title: impl Into<String>) -> ShellResult<Rc<Self>> {
        let title = title.into();
        registry.construct(|registration| MainFrame {
            title: RefCell::new(title),
            status: RefCell::new(String::new()),
            size: Cell::new(Self::DEFAULT_SIZE),
            registry: Rc::downgrade(registry),
            status_changed: RefCell::new(Callback::empty()),
            resized: RefCell::new(Callback::empty()),
            closed: RefCell::new(Callback::empty()),
            _registration: registration,
        })
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.borrow_mut() = title.into();
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Show `text` in the status line and copy it to the output log if one
    /// is open.
    pub fn set_status(&self, text: &str) {
        *self.status.borrow_mut() = text.to_string();
        if let Some(registry) = self.registry.upgrade() {
            append_to_output_log(&registry, &format!("{text}\n"));
        }
        let callback = self.status_changed.borrow().clone();
        callback.invoke(text);
    }

    /// Ask listeners to close the frame.
    pub fn close(&self) {
        let callback = self.closed.borrow().clone();
        callback.fire();
    }

    pub fn on_status_changed(&self, callback: Callback<str>) {
        self.status_changed.borrow_mut().bind(callback);
    }

    pub fn on_resized(&self, callback: Callback<(u32, u32)>) {
        self.resized.borrow_mut().bind(callback);
    }

    pub fn on_closed(&self, callback: Callback<()>) {
        self.closed.borrow_mut().bind(callback);
    }
}

impl Typed for MainFrame {
    fn declare(lineage: &mut Lineage) {
        lineage.inherits::<dyn TopLevelShell>();
    }
}

impl Resizable for MainFrame {
    fn size(&self) -> Size {
        self.size.get()
    }

    fn resize(&self, size: Size) {
        if self.size.replace(size) == size {
            return;
        }
        let callback = self.resized.borrow().clone();
        callback.invoke(&(size.width, size.height));
    }
}

impl TopLevelShell for MainFrame {
    fn kind(&self) -> ShellKind {
        ShellKind::MainFrame
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }
}

impl Component for MainFrame {
    fn as_resizable(&self) -> Option<&dyn Resizable> {
        Some(self)
    }

    fn as_top_level(&self) -> Option<&dyn TopLevelShell> {
        Some(self)
    }
}
