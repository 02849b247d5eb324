//! The favorites drawer: list rendering, empty state, open/close machine.
//!
//! Rendering is clear-and-rebuild from the store. Rows removed from inside
//! the drawer are not re-rendered away; they play an exit transition and
//! detach themselves on `transitionend`, or on a fallback timer when the
//! transition never fires (reduced motion, hidden list).

use std::fmt;
use std::time::Duration;

use wishlist_core::FavoriteEntry;

use crate::button::bind;
use crate::config::Labels;
use crate::dom::{DrawerRow, Page, Timer, TimerId, attrs, classes, selectors};
use crate::error::{Result, WishlistError};
use crate::events::Listener;
use crate::format::MoneyFormatter;

/// Drawer visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawerState {
    #[default]
    Closed,
    Open,
}

/// The drawer's elements and state.
#[derive(Debug)]
pub struct Drawer<E> {
    root: E,
    panel: Option<E>,
    items: E,
    empty: E,
    state: DrawerState,
    exiting: Vec<(E, TimerId)>,
    row_exit: Duration,
}

impl<E: Clone + PartialEq + fmt::Debug> Drawer<E> {
    /// Find the drawer markup.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::MissingElement`] if the drawer, its item list
    /// or its empty state is absent. The panel is optional.
    pub fn locate<P: Page<Element = E>>(page: &P, row_exit: Duration) -> Result<Self> {
        let root = page
            .query(selectors::DRAWER)
            .ok_or(WishlistError::MissingElement(selectors::DRAWER))?;
        let items = first_within(page, &root, selectors::ITEMS)?;
        let empty = first_within(page, &root, selectors::EMPTY)?;
        let panel = page.query_within(&root, selectors::PANEL).into_iter().next();

        Ok(Self {
            root,
            panel,
            items,
            empty,
            state: DrawerState::Closed,
            exiting: Vec::new(),
            row_exit,
        })
    }

    #[must_use]
    pub const fn root(&self) -> &E {
        &self.root
    }

    #[must_use]
    pub const fn state(&self) -> DrawerState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == DrawerState::Open
    }

    /// Bind the close triggers inside the drawer.
    pub fn bind_close_triggers<P: Page<Element = E>>(&self, page: &P) -> usize {
        page.query_within(&self.root, selectors::CLOSE)
            .iter()
            .filter(|trigger| bind(page, trigger, Listener::DrawerClose))
            .count()
    }

    /// Rebuild the list from `entries` and toggle the empty state.
    ///
    /// A rebuild supersedes any row still exiting.
    pub fn render<P: Page<Element = E>>(
        &mut self,
        page: &P,
        entries: &[FavoriteEntry],
        formatter: &dyn MoneyFormatter,
        labels: &Labels,
    ) {
        for (_, timer) in self.exiting.drain(..) {
            page.clear_timeout(timer);
        }

        let rows: Vec<DrawerRow> = entries
            .iter()
            .map(|entry| DrawerRow {
                key: entry.key().clone(),
                title: entry.title.clone(),
                url: entry.url.clone(),
                price: formatter.format(entry.price),
                image: entry.media().map(str::to_string),
                view_label: labels.view_product.clone(),
                remove_label: labels.remove_from_wishlist.clone(),
            })
            .collect();

        page.render_rows(&self.items, &rows);
        self.show_empty_state(page, entries.len());
        tracing::debug!(rows = rows.len(), "Drawer rendered");
    }

    /// Show the empty placeholder at zero favorites, the list otherwise.
    pub fn show_empty_state<P: Page<Element = E>>(&self, page: &P, count: usize) {
        page.toggle_class(&self.items, classes::HIDDEN, count == 0);
        page.toggle_class(&self.empty, classes::HIDDEN, count != 0);
    }

    /// Open the drawer and move focus into its panel.
    ///
    /// Returns whether the drawer was closed before.
    pub fn open<P: Page<Element = E>>(&mut self, page: &P) -> bool {
        let was_closed = self.state == DrawerState::Closed;

        page.toggle_class(&self.root, classes::DRAWER_ACTIVE, true);
        page.set_attribute(&self.root, attrs::ARIA_HIDDEN, "false");
        page.set_body_class(classes::BODY_OPEN, true);
        if let Some(panel) = &self.panel {
            page.focus(panel);
        }

        self.state = DrawerState::Open;
        was_closed
    }

    /// Close the drawer. Idempotent.
    ///
    /// Returns whether the drawer was open before.
    pub fn close<P: Page<Element = E>>(&mut self, page: &P) -> bool {
        let was_open = self.state == DrawerState::Open;

        page.toggle_class(&self.root, classes::DRAWER_ACTIVE, false);
        page.set_attribute(&self.root, attrs::ARIA_HIDDEN, "true");
        page.set_body_class(classes::BODY_OPEN, false);

        self.state = DrawerState::Closed;
        was_open
    }

    /// The rendered row for `key`, if any.
    pub fn row_for<P: Page<Element = E>>(&self, page: &P, key: &str) -> Option<E> {
        page.query_within(&self.items, selectors::ROW)
            .into_iter()
            .find(|row| page.attribute(row, attrs::ROW_KEY).as_deref() == Some(key))
    }

    /// Start the exit transition of the row for `key`.
    ///
    /// Returns whether a row was found.
    pub fn begin_row_exit<P: Page<Element = E>>(&mut self, page: &P, key: &str) -> bool {
        let Some(row) = self.row_for(page, key) else {
            return false;
        };
        if self.exiting.iter().any(|(exiting, _)| *exiting == row) {
            return true;
        }

        page.toggle_class(&row, classes::ROW_REMOVING, true);
        page.listen(&row, Listener::RowTransition);
        let timer = page.set_timeout(self.row_exit, Timer::DetachRow(row.clone()));
        self.exiting.push((row, timer));
        true
    }

    /// Detach an exiting row, from its transition end or its fallback timer.
    ///
    /// Elements that are not exiting rows are ignored.
    pub fn finish_row_exit<P: Page<Element = E>>(&mut self, page: &P, row: &E) {
        let Some(index) = self.exiting.iter().position(|(exiting, _)| exiting == row) else {
            return;
        };

        let (row, timer) = self.exiting.swap_remove(index);
        page.clear_timeout(timer);
        if page.is_attached(&row) {
            page.detach(&row);
        }
    }

    /// Number of rows still playing their exit transition.
    #[must_use]
    pub fn rows_exiting(&self) -> usize {
        self.exiting.len()
    }
}

fn first_within<P: Page>(page: &P, root: &P::Element, selector: &'static str) -> Result<P::Element> {
    page.query_within(root, selector)
        .into_iter()
        .next()
        .ok_or(WishlistError::MissingElement(selector))
}
