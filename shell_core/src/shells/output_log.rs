//! Output log window: an append-only text pane.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::callback::Callback;
use crate::errors::ShellResult;
use crate::registry::{InstanceRegistry, Registration};
use crate::types::{Lineage, Typed};

use super::{Colorable, Component, Resizable, Rgb, ShellKind, Size, TopLevelShell};

/// Append-only text pane; at most one is reachable by type.
pub struct OutputLog {
    text: RefCell<String>,
    size: Cell<Size>,
    background: Cell<Rgb>,
    appended: RefCell<Callback<str>>,
    registration: Registration,
}

impl OutputLog {
    pub const DEFAULT_SIZE: Size = Size::new(640, 240);

    /// Construct and register an output log.
    pub fn new(registry: &Rc<InstanceRegistry>) -> ShellResult<Rc<Self>> {
        registry.construct(|registration| OutputLog {
            text: RefCell::new(String::new()),
            size: Cell::new(Self::DEFAULT_SIZE),
            background: Cell::new(Rgb::WHITE),
            appended: RefCell::new(Callback::empty()),
            registration,
        })
    }

    /// Append `text` verbatim to the displayed text.
    pub fn append(&self, text: &str) {
        self.text.borrow_mut().push_str(text);
        let appended = self.appended.borrow().clone();
        appended.invoke(text);
    }

    /// Append `text` followed by a newline.
    pub fn append_line(&self, text: &str) {
        self.append(text);
        self.append("\n");
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn clear(&self) {
        self.text.borrow_mut().clear();
    }

    /// Called with each appended fragment after it is displayed.
    pub fn on_appended(&self, callback: Callback<str>) {
        self.appended.borrow_mut().bind(callback);
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }
}

/// Append to the open output log, if there is one. Returns whether a log was
/// found.
pub fn append_to_output_log(registry: &InstanceRegistry, text: &str) -> bool {
    match registry.instance::<OutputLog>() {
        Some(log) => {
            log.append(text);
            true
        }
        None => false,
    }
}

impl Typed for OutputLog {
    fn declare(lineage: &mut Lineage) {
        lineage.inherits::<dyn TopLevelShell>().inherits::<dyn Colorable>();
    }
}

impl Resizable for OutputLog {
    fn size(&self) -> Size {
        self.size.get()
    }

    fn resize(&self, size: Size) {
        self.size.set(size);
    }
}

impl Colorable for OutputLog {
    fn background(&self) -> Rgb {
        self.background.get()
    }

    fn set_background(&self, color: Rgb) {
        self.background.set(color);
    }
}

impl TopLevelShell for OutputLog {
    fn kind(&self) -> ShellKind {
        ShellKind::OutputLog
    }

    fn title(&self) -> String {
        ShellKind::OutputLog.display_name().to_string()
    }
}

impl Component for OutputLog {
    fn as_resizable(&self) -> Option<&dyn Resizable> {
        Some(self)
    }

    fn as_colorable(&self) -> Option<&dyn Colorable> {
        Some(self)
    }

    fn as_top_level(&self) -> Option<&dyn TopLevelShell> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::Delivery;
    use crate::registry::RegistryEvent;
    use crate::types::TypeTag;

    #[test]
    fn test_output_log_scenario() {
        let registry = Rc::new(InstanceRegistry::default());
        let tag = TypeTag::of::<OutputLog>();
        assert!(registry.get_instance_by_type(tag).is_none());

        let window = OutputLog::new(&registry).unwrap();
        let found = registry.get_instance_by_type(tag).unwrap();
        assert!(std::ptr::eq(Rc::as_ptr(&found) as *const OutputLog, Rc::as_ptr(&window)));
        drop(found);

        let append: Callback<str> = Callback::method(&window, OutputLog::append);
        assert_eq!(append.invoke("hello"), Delivery::Delivered);
        assert!(window.text().ends_with("hello"));
        assert_eq!(window.text(), "hello");
        assert_eq!(window.size(), OutputLog::DEFAULT_SIZE);

        drop(window);
        assert!(registry.get_instance_by_type(tag).is_none());
        assert_eq!(append.invoke("late"), Delivery::Dropped);
    }

    #[test]
    fn test_append_to_open_log() {
        let registry = Rc::new(InstanceRegistry::default());
        assert!(!append_to_output_log(&registry, "nobody listens"));

        let log = OutputLog::new(&registry).unwrap();
        assert!(append_to_output_log(&registry, "first"));
        log.append_line("");
        assert!(append_to_output_log(&registry, "second"));
        assert_eq!(log.text(), "first\nsecond");

        log.clear();
        assert_eq!(log.text(), "");
    }

    #[test]
    fn test_observer_greets_new_log() {
        let registry = Rc::new(InstanceRegistry::default());
        let greeted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&greeted);
        let weak_registry = Rc::downgrade(&registry);
        registry.set_observer(Callback::new(move |event: &RegistryEvent| {
            if let (RegistryEvent::Registered { .. }, Some(registry)) = (event, weak_registry.upgrade()) {
                sink.borrow_mut().push(append_to_output_log(&registry, "welcome"));
            }
        }));

        let log = OutputLog::new(&registry).unwrap();
        assert_eq!(greeted.borrow().as_slice(), &[true]);
        assert_eq!(log.text(), "welcome");
    }

    #[test]
    fn test_appended_callback() {
        let registry = Rc::new(InstanceRegistry::default());
        let log = OutputLog::new(&registry).unwrap();

        let fragments = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fragments);
        log.on_appended(Callback::new(move |text: &str| sink.borrow_mut().push(text.to_string())));

        log.append("a");
        log.append("b");
        assert_eq!(fragments.borrow().as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_colorable() {
        let registry = Rc::new(InstanceRegistry::default());
        let log = OutputLog::new(&registry).unwrap();
        let colorable = log.as_colorable().unwrap();
        colorable.set_background(Rgb::BLACK);
        assert_eq!(log.background(), Rgb::BLACK);
    }
}
