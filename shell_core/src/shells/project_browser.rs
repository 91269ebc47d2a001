//! Project browser: a top-level list of project items.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::callback::Callback;
use crate::errors::ShellResult;
use crate::registry::{InstanceRegistry, Registration};
use crate::types::{Lineage, Typed};

use super::{Component, ListView, Resizable, ShellKind, Size, TopLevelShell};

pub struct ProjectBrowser {
    items: RefCell<Vec<String>>,
    selected: Cell<Option<usize>>,
    size: Cell<Size>,
    /// Fired with (row, label) whenever the selection moves to a new row
    selection_changed: RefCell<Callback<(usize, String)>>,
    _registration: Registration,
}

impl ProjectBrowser {
    pub const DEFAULT_SIZE: Size = Size::new(280, 600);

    pub fn new(registry: &Rc<InstanceRegistry>) -> ShellResult<Rc<Self>> {
        registry.construct(|registration| ProjectBrowser {
            items: RefCell::new(Vec::new()),
            selected: Cell::new(None),
            size: Cell::new(Self::DEFAULT_SIZE),
            selection_changed: RefCell::new(Callback::empty()),
            _registration: registration,
        })
    }

    /// Replace the rows. Clears the selection.
    pub fn set_items<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.items.borrow_mut() = items.into_iter().map(Into::into).collect();
        self.selected.set(None);
    }

    pub fn on_selection_changed(&self, callback: Callback<(usize, String)>) {
        self.selection_changed.borrow_mut().bind(callback);
    }
}

impl Typed for ProjectBrowser {
    fn declare(lineage: &mut Lineage) {
        lineage.inherits::<dyn TopLevelShell>().inherits::<dyn ListView>();
    }
}

impl Resizable for ProjectBrowser {
    fn size(&self) -> Size {
        self.size.get()
    }

    fn resize(&self, size: Size) {
        self.size.set(size);
    }
}

impl TopLevelShell for ProjectBrowser {
    fn kind(&self) -> ShellKind {
        ShellKind::ProjectBrowser
    }

    fn title(&self) -> String {
        ShellKind::ProjectBrowser.display_name().to_string()
    }
}

impl ListView for ProjectBrowser {
    fn items(&self) -> Vec<String> {
        self.items.borrow().clone()
    }

    fn selected(&self) -> Option<usize> {
        self.selected.get()
    }

    fn select(&self, index: usize) -> bool {
        let label = match self.items.borrow().get(index) {
            Some(label) => label.clone(),
            None => return false,
        };
        if self.selected.replace(Some(index)) == Some(index) {
            return true;
        }
        let callback = self.selection_changed.borrow().clone();
        callback.invoke(&(index, label));
        true
    }
}

impl Component for ProjectBrowser {
    fn as_resizable(&self) -> Option<&dyn Resizable> {
        Some(self)
    }

    fn as_top_level(&self) -> Option<&dyn TopLevelShell> {
        Some(self)
    }

    fn as_list_view(&self) -> Option<&dyn ListView> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser() -> (Rc<InstanceRegistry>, Rc<ProjectBrowser>) {
        let registry = Rc::new(InstanceRegistry::default());
        let browser = ProjectBrowser::new(&registry).unwrap();
        browser.set_items(["B-1 Floor Beam", "C-1 Column", "H-1 Header"]);
        (registry, browser)
    }

    #[test]
    fn test_selection_fires_once_per_change() {
        let (_registry, browser) = browser();
        let picks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&picks);
        browser.on_selection_changed(Callback::new(move |row: &usize, label: &String| {
            sink.borrow_mut().push((*row, label.clone()));
        }));

        assert!(browser.select(1));
        assert!(browser.select(1));
        assert!(browser.select(2));
        assert!(!browser.select(9));

        assert_eq!(
            picks.borrow().as_slice(),
            &[(1, "C-1 Column".to_string()), (2, "H-1 Header".to_string())]
        );
        assert_eq!(browser.selected(), Some(2));
    }

    #[test]
    fn test_set_items_clears_selection() {
        let (_registry, browser) = browser();
        browser.select(0);
        browser.set_items(vec![String::from("Only")]);
        assert_eq!(browser.selected(), None);
        assert_eq!(browser.items(), vec!["Only".to_string()]);
    }

    #[test]
    fn test_list_view_accessor() {
        let (_registry, browser) = browser();
        let list = browser.as_list_view().unwrap();
        assert_eq!(list.items().len(), 3);
        list.resize(Size::new(300, 400));
        assert_eq!(browser.size(), Size::new(300, 400));
        assert!(browser.as_colorable().is_none());
    }
}
