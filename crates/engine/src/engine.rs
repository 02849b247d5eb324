//! The mounted wishlist: owns the store and drives the sync cascade.
//!
//! Every mutation, whatever its source (a favorite button, a drawer row, a
//! Facade call), runs the same cascade after the store has persisted:
//! count badge and toggle labels, drawer, then every favorite button in the
//! document. Discovery passes (observed insertions, section reloads) run the
//! same synchronization quietly, without pulses.

use std::fmt;

use wishlist_core::FavoriteEntry;

use crate::animation::{Animator, Pulse};
use crate::button::{
    bind_drawer_toggles, bind_favorite_buttons, contains_matching, entry_from_button,
};
use crate::config::WishlistConfig;
use crate::dom::{Page, Timer, classes, selectors};
use crate::drawer::Drawer;
use crate::error::Result;
use crate::events::{ESCAPE_KEY, Event};
use crate::format::{CurrencyFormatter, MoneyFormatter};
use crate::storage::{Migration, Storage, migrate_legacy_key};
use crate::store::FavoriteStore;
use crate::sync;

/// A wishlist mounted on a page.
///
/// Built once by [`Wishlist::mount`]; hosts hold it for the page's lifetime
/// and feed it [`Event`]s.
pub struct Wishlist<P: Page, S: Storage> {
    page: P,
    store: FavoriteStore<S>,
    drawer: Drawer<P::Element>,
    animator: Animator<P::Element>,
    formatter: Box<dyn MoneyFormatter>,
    config: WishlistConfig,
}

impl<P: Page, S: Storage> fmt::Debug for Wishlist<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wishlist")
            .field("storage_key_scope", &self.config.identity.scope())
            .field("favorites", &self.store.len())
            .field("drawer", &self.drawer.state())
            .finish_non_exhaustive()
    }
}

impl<P: Page, S: Storage> Wishlist<P, S> {
    /// Mount the wishlist on `page`.
    ///
    /// Locates the drawer, migrates the legacy storage key for identified
    /// customers, loads the favorites, binds every control in the document and
    /// brings all surfaces in line with the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WishlistError::MissingElement`] when the drawer markup
    /// is incomplete. Nothing is bound in that case.
    pub fn mount(page: P, storage: S, config: WishlistConfig) -> Result<Self> {
        let drawer = Drawer::locate(&page, config.animation.row_exit)?;
        page.move_to_body(drawer.root());

        let scope = config.identity.scope();
        match migrate_legacy_key(&storage, &config.identity) {
            Ok(Migration::Migrated) => tracing::info!(scope, "Migrated legacy favorites"),
            Ok(outcome) => tracing::debug!(scope, ?outcome, "Legacy favorites check"),
            Err(e) => tracing::warn!(scope, error = %e, "Legacy favorites migration failed"),
        }

        let store = FavoriteStore::load(storage, config.identity.storage_key());
        let mut wishlist = Self {
            formatter: Box::new(CurrencyFormatter::from_config(&config)),
            animator: Animator::new(config.animation),
            page,
            store,
            drawer,
            config,
        };

        let closers = wishlist.drawer.bind_close_triggers(&wishlist.page);
        let toggles = bind_drawer_toggles(&wishlist.page);
        let buttons = bind_favorite_buttons(&wishlist.page);
        wishlist.render_drawer();
        wishlist.resync();

        tracing::info!(
            scope,
            favorites = wishlist.store.len(),
            buttons,
            toggles,
            closers,
            "Wishlist mounted"
        );
        Ok(wishlist)
    }

    /// Replace the money formatter and re-render the drawer with it.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl MoneyFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self.render_drawer();
        self
    }

    /// React to one host event.
    pub fn handle(&mut self, event: Event<P::Element>) {
        match event {
            Event::FavoriteClicked(button) => self.favorite_clicked(&button),
            Event::DrawerToggleClicked => {
                if self.drawer.is_open() {
                    self.close_drawer();
                } else {
                    self.open_drawer();
                }
            }
            Event::CloseClicked => self.close_drawer(),
            Event::KeyDown(key) => {
                if key == ESCAPE_KEY && self.drawer.is_open() {
                    self.close_drawer();
                }
            }
            Event::ViewProduct(key) => self.view_product(key.as_str()),
            Event::RemoveFromDrawer(key) => self.remove_from_drawer(key.as_str()),
            Event::NodesInserted(nodes) => {
                if contains_matching(&self.page, &nodes, selectors::DRAWER) {
                    self.relocate_drawer();
                }
                if contains_matching(&self.page, &nodes, selectors::BUTTON)
                    || contains_matching(&self.page, &nodes, selectors::TOGGLE)
                {
                    self.rediscover();
                }
            }
            Event::SectionReloaded => {
                self.relocate_drawer();
                self.rediscover();
            }
            Event::TimerElapsed(Timer::EndPulse(button)) => {
                self.animator.finish(&self.page, &button);
            }
            Event::TimerElapsed(Timer::DetachRow(row)) | Event::TransitionEnd(row) => {
                self.drawer.finish_row_exit(&self.page, &row);
            }
        }
    }

    #[must_use]
    pub const fn page(&self) -> &P {
        &self.page
    }

    #[must_use]
    pub const fn store(&self) -> &FavoriteStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &WishlistConfig {
        &self.config
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.drawer.is_open()
    }

    pub(crate) fn open_drawer(&mut self) {
        self.render_drawer();
        if self.drawer.open(&self.page) {
            tracing::debug!("Drawer opened");
        }
        self.update_toggles();
    }

    pub(crate) fn close_drawer(&mut self) {
        if self.drawer.close(&self.page) {
            tracing::debug!("Drawer closed");
        }
        self.update_toggles();
    }

    pub(crate) fn store_mut(&mut self) -> &mut FavoriteStore<S> {
        &mut self.store
    }

    /// Bring every surface in line with the store after a mutation.
    ///
    /// Buttons whose state flipped pulse, except `clicked`, which the caller
    /// pulses itself.
    pub(crate) fn after_mutation(&mut self, clicked: Option<&P::Element>) {
        self.update_count();
        self.render_drawer();
        self.sync_buttons(clicked);
    }

    fn favorite_clicked(&mut self, button: &P::Element) {
        let Some(entry) = entry_from_button(&self.page, button) else {
            tracing::debug!("Ignoring favorite button without a product id");
            return;
        };

        let toggled = self.store.toggle(entry);
        self.after_mutation(Some(button));
        self.animator
            .play(&self.page, button, Pulse::for_state(toggled.is_favorite()));
    }

    fn view_product(&mut self, key: &str) {
        let target = self
            .find(key)
            .and_then(FavoriteEntry::navigation_target)
            .map(str::to_string);

        self.close_drawer();
        if let Some(url) = target {
            self.page.navigate(&url);
        }
    }

    /// Remove from a drawer row: the row exits on its own, every other
    /// surface updates immediately.
    fn remove_from_drawer(&mut self, key: &str) {
        if !self.store.remove(key) {
            return;
        }

        if !self.drawer.begin_row_exit(&self.page, key) {
            self.render_drawer();
        }
        self.drawer.show_empty_state(&self.page, self.store.len());
        self.update_count();
        self.sync_buttons(None);
    }

    /// Bind newly present controls and resync them without pulses.
    fn rediscover(&mut self) {
        let toggles = bind_drawer_toggles(&self.page);
        let buttons = bind_favorite_buttons(&self.page);
        if toggles + buttons > 0 {
            tracing::debug!(buttons, toggles, "Bound discovered controls");
        }
        self.resync();
    }

    /// Quiet synchronization: count, labels and buttons, no pulses.
    fn resync(&self) {
        self.update_count();
        sync::sync_favorite_buttons(&self.page, &self.store, &self.config.labels);
    }

    /// Pick up a drawer the theme re-rendered or swapped in.
    ///
    /// No-op while the mounted drawer is still in the document.
    fn relocate_drawer(&mut self) {
        if self.page.is_attached(self.drawer.root()) {
            return;
        }

        match Drawer::locate(&self.page, self.config.animation.row_exit) {
            Ok(drawer) => {
                self.page.move_to_body(drawer.root());
                self.drawer = drawer;
                self.drawer.bind_close_triggers(&self.page);
                self.render_drawer();
                self.page.set_body_class(classes::BODY_OPEN, false);
                tracing::debug!("Drawer re-rendered by the theme; relocated");
            }
            Err(e) => tracing::warn!(error = %e, "Drawer removed by the theme"),
        }
    }

    fn update_count(&self) {
        sync::update_count(&self.page, self.store.len());
        self.update_toggles();
    }

    fn update_toggles(&self) {
        sync::update_drawer_toggles(
            &self.page,
            &self.config.labels,
            self.store.len(),
            self.drawer.is_open(),
        );
    }

    fn render_drawer(&mut self) {
        self.drawer.render(
            &self.page,
            self.store.entries(),
            self.formatter.as_ref(),
            &self.config.labels,
        );
    }

    fn sync_buttons(&mut self, clicked: Option<&P::Element>) {
        let changes = sync::sync_favorite_buttons(&self.page, &self.store, &self.config.labels);
        for change in changes {
            if clicked != Some(&change.button) {
                self.animator
                    .play(&self.page, &change.button, Pulse::for_state(change.is_favorite));
            }
        }
    }

    fn find(&self, key: &str) -> Option<&FavoriteEntry> {
        self.store.entries().iter().find(|e| e.key().as_str() == key)
    }
}
