//! The home page: a heading, the select form field and a readout of the
//! selected value, on a headless element tree.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use dropline_cn::prelude::*;
use dropline_core::{ElementId, ElementTree, EventDispatcher, EventRouter, Subscription};
use dropline_forms::GroupValue;
use taffy::prelude::{Dimension, Size, Style};

use crate::config::DroplineConfig;
use crate::error::Result;
use crate::script::Interaction;
use crate::source::OptionSource;

/// Key prefix of the page's select elements
pub const SELECT_KEY: &str = "home/select";

/// The mounted home page
pub struct HomePage {
    tree: ElementTree,
    router: EventRouter,
    field: FormField,
    readout: ElementId,
    /// Every value published on the field's `selected` stream
    published: Rc<RefCell<Vec<String>>>,
    _published_sub: Subscription,
}

impl HomePage {
    /// Fetch options from `source` and build the page
    pub async fn load<S: OptionSource>(config: &DroplineConfig, source: &S) -> Result<Self> {
        let options = source.fetch_options().await?;
        Self::new(config, options)
    }

    /// Build and mount the page with the given options
    pub fn new(config: &DroplineConfig, options: Vec<SelectOption>) -> Result<Self> {
        let mut tree = ElementTree::new(config.viewport.width, config.viewport.height)?;
        let router = EventRouter::new(EventDispatcher::new());
        let root = tree.root();

        let heading = tree.create_child(root, "h1", Self::line_style(32.0))?;
        tree.set_text(heading, "Home")?;

        let select = cn::select()
            .key(SELECT_KEY)
            .options(options)
            .placeholder(config.select.placeholder.clone())
            .size(config.select.size)
            .w(config.select.width)
            .build();
        let field = cn::form_field(select)
            .field(config.form.field.clone())
            .disabled(config.form.disabled)
            .build();

        let published = Rc::new(RefCell::new(Vec::new()));
        let published_clone = Rc::clone(&published);
        let published_sub = field
            .selected()
            .subscribe(move |value: &String| published_clone.borrow_mut().push(value.clone()));

        field.mount(&mut tree, root, router.dispatcher())?;

        let readout = tree.create_child(root, "p", Self::line_style(24.0))?;

        let mut page = Self {
            tree,
            router,
            field,
            readout,
            published,
            _published_sub: published_sub,
        };
        page.refresh()?;
        tracing::info!(
            options = page.field.select().options().len(),
            selected = %page.selected(),
            "home page ready"
        );
        Ok(page)
    }

    fn line_style(height: f32) -> Style {
        Style {
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Length(height),
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn field(&self) -> &FormField {
        &self.field
    }

    /// Latest value on the field's `selected` stream
    pub fn selected(&self) -> String {
        self.field.selected().get()
    }

    /// Values published on the `selected` stream so far
    pub fn published(&self) -> Vec<String> {
        self.published.borrow().clone()
    }

    pub fn form_value(&self) -> GroupValue {
        self.field.group().value()
    }

    /// One-line summary of the select and form control flags
    pub fn status(&self) -> String {
        let select = self.field.select();
        let control = self.field.control();
        let flag = |on: bool, name: &'static str| if on { name } else { "-" };
        format!(
            "select: {} {} {} | control: {} {} {}",
            if select.is_open() { "open" } else { "closed" },
            flag(select.is_disabled(), "disabled"),
            flag(select.is_touched(), "touched"),
            flag(control.is_disabled(), "disabled"),
            flag(control.is_touched(), "touched"),
            flag(control.is_dirty(), "dirty"),
        )
    }

    /// Perform one interaction and bring the tree up to date
    pub fn apply(&mut self, interaction: &Interaction) -> Result<()> {
        tracing::debug!(%interaction, "applying interaction");
        let select = self.field.select().clone();

        match interaction {
            Interaction::ClickTrigger => match select.trigger() {
                Some(trigger) => {
                    self.router.click_element(&self.tree, trigger);
                }
                None => tracing::warn!("select is not mounted"),
            },
            Interaction::ClickOption(value) => match select.option_element(value) {
                Some(row) if self.tree.is_visible(row) => {
                    self.router.click_element(&self.tree, row);
                }
                Some(_) => tracing::warn!(value = %value, "option is hidden; open the list first"),
                None => tracing::warn!(value = %value, "no option with this value"),
            },
            Interaction::ClickOutside => {
                self.router.click_outside(&self.tree);
            }
            Interaction::ClickAt { x, y } => {
                self.router.click_at(&self.tree, *x, *y);
            }
            Interaction::Write(value) => self.field.control().set_value(value.clone()),
            Interaction::Disable => self.field.disable(),
            Interaction::Enable => self.field.enable(),
        }

        self.refresh()
    }

    /// Sync the field view, the readout and layout
    fn refresh(&mut self) -> Result<()> {
        if self.field.needs_render() {
            self.field.sync_view(&mut self.tree)?;
        }
        let readout = format!("Selected: {}", self.selected());
        self.tree.set_text(self.readout, readout)?;
        self.tree.compute_layout()?;
        Ok(())
    }

    /// Text rendering of the visible element tree
    ///
    /// One element per line, indented by depth: `tag.class "text"`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_element(self.tree.root(), 0, &mut out);
        out
    }

    fn render_element(&self, id: ElementId, depth: usize, out: &mut String) {
        if !self.tree.is_visible(id) {
            return;
        }
        let _ = write!(out, "{:indent$}{}", "", self.tree.tag(id).unwrap_or("?"), indent = depth * 2);
        for class in self.tree.classes(id) {
            let _ = write!(out, ".{class}");
        }
        if let Some(text) = self.tree.text(id) {
            let _ = write!(out, " {text:?}");
        }
        out.push('\n');

        for child in self.tree.children(id) {
            self.render_element(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    fn fruits() -> Vec<SelectOption> {
        vec![
            SelectOption::new("apple", "Apple"),
            SelectOption::new("banana", "Banana"),
            SelectOption::new("cherry", "Cherry"),
        ]
    }

    fn page() -> HomePage {
        HomePage::new(&DroplineConfig::default(), fruits()).unwrap()
    }

    fn run(page: &mut HomePage, script: &[&str]) {
        for line in script {
            page.apply(&line.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn test_load_from_source() {
        let source = StaticSource::new(fruits());
        let page = pollster::block_on(HomePage::load(&DroplineConfig::default(), &source)).unwrap();
        assert_eq!(page.selected(), "apple");
        assert_eq!(page.form_value()["customDropdown"], "apple");
    }

    #[test]
    fn test_initial_render() {
        let page = page();
        assert_eq!(
            page.render(),
            "root\n  h1 \"Home\"\n  select\n    select-trigger \"Apple\"\n  p \"Selected: apple\"\n"
        );
        assert_eq!(
            page.published(),
            vec!["".to_string(), "apple".to_string(), "apple".to_string()]
        );
    }

    #[test]
    fn test_open_and_choose() {
        let mut page = page();
        run(&mut page, &["click trigger", "click option banana"]);

        assert_eq!(page.selected(), "banana");
        assert!(page.field().select().is_open());
        let rendered = page.render();
        assert!(rendered.contains("select.open"));
        assert!(rendered.contains("select-option.selected \"Banana\""));
        assert!(rendered.contains("Selected: banana"));

        run(&mut page, &["click outside"]);
        assert!(!page.field().select().is_open());
        assert!(!page.render().contains("select-option"));
    }

    #[test]
    fn test_hidden_option_is_not_clicked() {
        let mut page = page();
        run(&mut page, &["click option cherry"]);
        assert_eq!(page.selected(), "apple");
    }

    #[test]
    fn test_click_on_heading_closes_list() {
        let mut page = page();
        run(&mut page, &["click trigger", "click 5 5"]);
        assert!(!page.field().select().is_open());
    }

    #[test]
    fn test_click_at_trigger_point_toggles() {
        let mut page = page();
        // Heading is 32px tall; the trigger sits right below it
        run(&mut page, &["click 10 50"]);
        assert!(page.field().select().is_open());
    }

    #[test]
    fn test_write_and_disable() {
        let mut page = page();
        run(&mut page, &["write cherry", "disable", "click trigger"]);

        assert_eq!(page.selected(), "cherry");
        assert!(!page.field().select().is_open());
        assert!(page.render().contains("select.disabled"));

        run(&mut page, &["enable", "click trigger"]);
        assert!(page.field().select().is_open());
    }

    #[test]
    fn test_status_tracks_flags() {
        let mut page = page();
        assert_eq!(page.status(), "select: closed - - | control: - - dirty");

        run(&mut page, &["click trigger", "click option banana", "disable"]);
        assert_eq!(
            page.status(),
            "select: open disabled touched | control: disabled touched dirty"
        );
    }

    #[test]
    fn test_disabled_from_config() {
        let mut config = DroplineConfig::default();
        config.form.disabled = true;
        let mut page = HomePage::new(&config, fruits()).unwrap();

        run(&mut page, &["click trigger"]);
        assert!(!page.field().select().is_open());
        assert_eq!(page.selected(), "apple");
    }

    #[test]
    fn test_no_options() {
        let mut page = HomePage::new(&DroplineConfig::default(), Vec::new()).unwrap();
        assert_eq!(page.selected(), "");
        assert!(page.render().contains("select-trigger.placeholder \"Select an option\""));

        run(&mut page, &["click trigger"]);
        assert!(page.field().select().is_open());
    }
}
