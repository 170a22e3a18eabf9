//! The top-level game session: one object owning the board, the ledgers,
//! and every engine, threaded explicitly through each operation.
//!
//! Nothing here is a global. The host constructs a session with
//! [`GameSession::new_game`] or [`GameSession::load`], feeds it player
//! input (`tap`, `drag_drop`, `sell`, ...), advances time with
//! [`GameSession::tick`], and drains the event bus for presentation.
//! Every public operation is atomic: it fully applies or fully no-ops,
//! and invariants hold between any two calls.

use crate::collection::Collection;
use crate::economy::Economy;
use crate::energy::EnergyPool;
use crate::error::ActionError;
use crate::event::{Event, EventBus};
use crate::fixed::Millis;
use crate::grid::Grid;
use crate::id::{AreaId, ChainId, ProducerId, SpecialKind};
use crate::inventory::Inventory;
use crate::item::Item;
use crate::merge::{self, MergeOutcome};
use crate::order::{OrderBoard, Reward};
use crate::producer::{BufferInfo, Emission, ProducerEngine};
use crate::registry::{ProducerKind, Registry, Tuning};
use crate::rng::GameRng;
use crate::scheduler::{Scheduler, TimerKind};
use crate::serialize::SaveState;
use crate::special::{SpecialItems, SplitOutcome};
use crate::village::{TaskBuilt, Village};
use serde::{Deserialize, Serialize};

/// Cumulative lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub merges: u64,
    pub orders_completed: u64,
    pub items_produced: u64,
}

/// What a drag release did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Merged(MergeOutcome),
    Moved { from: usize, to: usize },
}

/// The whole game state and its orchestration.
#[derive(Debug)]
pub struct GameSession {
    registry: Registry,
    tuning: Tuning,

    grid: Grid,
    energy: EnergyPool,
    economy: Economy,
    producers: ProducerEngine,
    orders: OrderBoard,
    inventory: Inventory,
    collection: Collection,
    specials: SpecialItems,
    village: Village,
    stats: Stats,

    unlocked_producers: Vec<ProducerId>,
    active_producers: Vec<ProducerId>,

    rng: GameRng,
    scheduler: Scheduler,
    events: EventBus,
    order_panel_open: bool,
}

impl GameSession {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Start a fresh game: cobwebs seeded, the first producer placed,
    /// starter pieces spawned, recurring timers scheduled.
    pub fn new_game(registry: Registry, tuning: Tuning, seed: u64, now: Millis) -> Self {
        let grid = Grid::new(tuning.grid_rows, tuning.grid_cols, &tuning.initial_cobwebs);
        let energy = EnergyPool::new(tuning.energy_max, now);
        let economy = Economy::new(0, tuning.starting_gems, 0);
        let orders = OrderBoard::new(tuning.order_slots);
        let inventory = Inventory::new(tuning.inventory_initial_slots);
        let mut session = Self {
            registry,
            tuning,
            grid,
            energy,
            economy,
            producers: ProducerEngine::new(),
            orders,
            inventory,
            collection: Collection::new(),
            specials: SpecialItems::new(),
            village: Village::new(AreaId(0)),
            stats: Stats::default(),
            unlocked_producers: Vec::new(),
            active_producers: Vec::new(),
            rng: GameRng::new(seed),
            scheduler: Scheduler::new(),
            events: EventBus::default(),
            order_panel_open: false,
        };
        session.setup_new_world(now);
        session
    }

    /// Restore a saved game: offline energy is reconciled in one step,
    /// missing producer markers are re-placed, and timers restart.
    pub fn load(registry: Registry, tuning: Tuning, save: SaveState, now: Millis) -> Self {
        let grid = Grid::from_saved(
            tuning.grid_rows,
            tuning.grid_cols,
            &save.grid,
            &save.cobwebs,
        );
        let mut energy =
            EnergyPool::from_saved(save.energy_current, save.energy_last_regen, tuning.energy_max);
        energy.catch_up(
            tuning.energy_regen_interval_ms,
            tuning.energy_regen_amount,
            now,
        );

        let mut unlocked_producers = save.unlocked_producers;
        let mut active_producers = save.active_producers;
        if unlocked_producers.is_empty() {
            if let Some(&first) = registry.producers_by_unlock_order().first() {
                unlocked_producers.push(first);
            }
        }
        if active_producers.is_empty() {
            active_producers = unlocked_producers.clone();
        }
        let producers = ProducerEngine::from_saved(&save.producers, &unlocked_producers, &registry);

        let orders = OrderBoard::from_saved(&save.orders, tuning.order_slots);
        let inventory_slots = save.inventory_slots.min(tuning.inventory_max_slots);
        let inventory = Inventory::from_saved(inventory_slots, &save.inventory_items);
        let village = Village::from_saved(save.village_completed, save.unlocked_areas);

        let mut session = Self {
            registry,
            tuning,
            grid,
            energy,
            economy: save.economy,
            producers,
            orders,
            inventory,
            collection: save.collection,
            specials: save.specials,
            village,
            stats: save.stats,
            unlocked_producers,
            active_producers,
            rng: save.rng,
            scheduler: Scheduler::new(),
            events: EventBus::default(),
            order_panel_open: false,
        };
        session.ensure_markers_on_grid();
        if session.orders.slots().iter().all(|s| s.is_none()) {
            let chains = session.active_chains();
            session.orders.fill_empty(&chains, &mut session.rng);
        }
        session.schedule_base_timers(now);
        for producer in session.active_producers.clone() {
            if let Some(ProducerKind::Auto { interval_ms }) =
                session.registry.producer(producer).map(|d| d.kind)
            {
                session
                    .scheduler
                    .schedule(now + interval_ms, TimerKind::AutoProduce(producer));
            }
        }
        session
    }

    /// Wipe everything and start over. Clears the timer queue first so a
    /// stale entry can never fire into the fresh state.
    pub fn reset(&mut self, seed: u64, now: Millis) {
        self.scheduler.clear();
        self.events.clear();
        self.grid = Grid::new(
            self.tuning.grid_rows,
            self.tuning.grid_cols,
            &self.tuning.initial_cobwebs,
        );
        self.energy = EnergyPool::new(self.tuning.energy_max, now);
        self.economy = Economy::new(0, self.tuning.starting_gems, 0);
        self.producers = ProducerEngine::new();
        self.orders = OrderBoard::new(self.tuning.order_slots);
        self.inventory = Inventory::new(self.tuning.inventory_initial_slots);
        self.collection = Collection::new();
        self.specials = SpecialItems::new();
        self.village = Village::new(AreaId(0));
        self.stats = Stats::default();
        self.unlocked_producers.clear();
        self.active_producers.clear();
        self.rng = GameRng::new(seed);
        self.order_panel_open = false;
        self.setup_new_world(now);
    }

    fn setup_new_world(&mut self, now: Millis) {
        if let Some(&first) = self.registry.producers_by_unlock_order().first() {
            self.unlock_producer(first, now);
            // Starter pieces from the first producer's chain, so the player
            // has something to merge immediately.
            if let Some(chain) = self.registry.producer(first).map(|d| d.chain) {
                for _ in 0..self.tuning.starter_piece_count {
                    let Some(index) = self.grid.find_empty_cell() else {
                        break;
                    };
                    self.grid.set(index, Some(Item::piece(chain, 1)));
                }
                self.collection.record(chain, 1);
            }
        }
        let chains = self.active_chains();
        self.orders.fill_empty(&chains, &mut self.rng);
        // Auto-producer timers were scheduled by unlock_producer.
        self.schedule_base_timers(now);
    }

    // -----------------------------------------------------------------------
    // Player input
    // -----------------------------------------------------------------------

    /// Tap a producer marker: emit one item next to it.
    pub fn tap(&mut self, index: usize, now: Millis) -> Result<Emission, ActionError> {
        let producer = self
            .grid
            .get(index)
            .and_then(|item| item.as_marker())
            .ok_or(ActionError::InvalidTarget)?;
        let emission = self.producers.tap_produce(
            producer,
            &self.registry,
            &mut self.grid,
            &mut self.energy,
            &mut self.rng,
            now,
        )?;
        self.record_emission(producer, emission, now);
        Ok(emission)
    }

    /// Release a dragged item over another cell: merge onto a compatible
    /// item, or move onto an empty cell.
    pub fn drag_drop(
        &mut self,
        source: usize,
        target: usize,
        now: Millis,
    ) -> Result<DragOutcome, ActionError> {
        let dragged = *self.grid.get(source).ok_or(ActionError::InvalidTarget)?;
        // Markers are tapped, not dragged; locked pieces do not move.
        if dragged.is_marker() || dragged.is_locked() {
            return Err(ActionError::InvalidTarget);
        }

        if self.grid.cell_is_occupied(target) {
            let outcome = merge::resolve_merge(
                &mut self.grid,
                &self.registry,
                &self.tuning,
                &mut self.rng,
                source,
                target,
                now,
            )?;
            self.record_merge(&outcome, now);
            Ok(DragOutcome::Merged(outcome))
        } else {
            merge::plain_move(&mut self.grid, source, target)?;
            self.events.emit(Event::Moved {
                from: source,
                to: target,
                at: now,
            });
            Ok(DragOutcome::Moved {
                from: source,
                to: target,
            })
        }
    }

    /// Drop a dragged item on the sell zone: remove it and credit coins.
    /// Producer markers are not sellable.
    pub fn sell(&mut self, index: usize, now: Millis) -> Result<u64, ActionError> {
        let item = *self.grid.get(index).ok_or(ActionError::InvalidTarget)?;
        if item.is_locked() {
            return Err(ActionError::InvalidTarget);
        }
        let coins = item
            .sell_value(self.tuning.sell_multiplier)
            .ok_or(ActionError::InvalidTarget)?;
        self.grid.take(index);
        self.economy.add_coins(coins);
        self.events.emit(Event::Sold {
            item,
            coins,
            at: now,
        });
        Ok(coins)
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Move a board item into the first free inventory slot.
    pub fn store_item(&mut self, index: usize) -> Result<usize, ActionError> {
        let item = *self.grid.get(index).ok_or(ActionError::InvalidTarget)?;
        if item.is_marker() || item.is_locked() {
            return Err(ActionError::InvalidTarget);
        }
        if self.inventory.free_slots() == 0 {
            return Err(ActionError::NoSpace);
        }
        self.grid.take(index);
        self.inventory.store(item)
    }

    /// Move an inventory item back to the first empty board cell.
    pub fn retrieve_item(&mut self, slot: usize) -> Result<usize, ActionError> {
        if self.inventory.get(slot).is_none() {
            return Err(ActionError::InvalidTarget);
        }
        let index = self.grid.find_empty_cell().ok_or(ActionError::NoSpace)?;
        if let Some(item) = self.inventory.take(slot) {
            self.grid.set(index, Some(item));
        }
        Ok(index)
    }

    /// Buy the next inventory slot with gems.
    pub fn expand_inventory(&mut self) -> Result<usize, ActionError> {
        if self.inventory.slots() >= self.tuning.inventory_max_slots {
            return Err(ActionError::NoSpace);
        }
        let cost = self.inventory.expand_cost(
            self.tuning.inventory_expand_base_cost,
            self.tuning.inventory_expand_multiplier,
        );
        self.economy.spend_gems(cost)?;
        self.inventory.add_slot(self.tuning.inventory_max_slots)?;
        Ok(self.inventory.slots())
    }

    // -----------------------------------------------------------------------
    // Special items
    // -----------------------------------------------------------------------

    /// Scissors: split a piece into two of the level below.
    pub fn use_scissors(&mut self, index: usize, now: Millis) -> Result<SplitOutcome, ActionError> {
        let outcome = self.specials.use_scissors(&mut self.grid, index)?;
        self.collection.record(outcome.chain, outcome.level);
        self.events.emit(Event::SpecialUsed {
            kind: SpecialKind::Scissors,
            at: now,
        });
        Ok(outcome)
    }

    /// Place a wildcard token in the first empty cell.
    pub fn use_wildcard(&mut self, now: Millis) -> Result<usize, ActionError> {
        let index = self.specials.use_wildcard(&mut self.grid)?;
        self.events.emit(Event::SpecialUsed {
            kind: SpecialKind::Wildcard,
            at: now,
        });
        Ok(index)
    }

    /// Hourglass: reset a producer's buffer and cooldown.
    pub fn use_hourglass(&mut self, producer: ProducerId, now: Millis) -> Result<(), ActionError> {
        self.specials.use_hourglass(&mut self.producers, producer)?;
        self.events.emit(Event::SpecialUsed {
            kind: SpecialKind::Hourglass,
            at: now,
        });
        Ok(())
    }

    /// Credit special-item charges (shop purchases, rewards).
    pub fn add_special_charges(&mut self, kind: SpecialKind, amount: u32) {
        self.specials.add(kind, amount);
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    /// Recompute the fulfillment flags against the board right now.
    pub fn check_fulfillment(&mut self) {
        self.orders.check_fulfillment(&self.grid);
    }

    /// Complete an order: consume its pieces, credit the reward, clear the
    /// slot and schedule its replacement.
    pub fn complete_order(&mut self, slot: usize, now: Millis) -> Result<Reward, ActionError> {
        let order = self.orders.complete(slot, &mut self.grid)?;
        self.economy.add_coins(order.reward.coins);
        self.economy.add_stars(order.reward.stars);
        self.stats.orders_completed += 1;
        self.events.emit(Event::OrderCompleted {
            slot,
            coins: order.reward.coins,
            stars: order.reward.stars,
            at: now,
        });
        self.scheduler.schedule(
            now + self.tuning.order_respawn_delay_ms,
            TimerKind::OrderRespawn { slot },
        );
        Ok(order.reward)
    }

    /// Tell the session whether the order panel is visible. While open, a
    /// fulfillment poll runs on a fixed interval.
    pub fn set_order_panel_open(&mut self, open: bool, now: Millis) {
        if open && !self.order_panel_open {
            self.order_panel_open = true;
            self.check_fulfillment();
            self.scheduler
                .schedule(now + self.tuning.fulfill_poll_ms, TimerKind::FulfillPoll);
        } else if !open && self.order_panel_open {
            self.order_panel_open = false;
            self.scheduler.cancel_fulfill_poll();
        }
    }

    // -----------------------------------------------------------------------
    // Village
    // -----------------------------------------------------------------------

    /// Spend stars on a repair task. Completing an area unlocks the next
    /// area and the next producer.
    pub fn build_task(
        &mut self,
        area: AreaId,
        task: usize,
        now: Millis,
    ) -> Result<TaskBuilt, ActionError> {
        let built = self
            .village
            .build_task(area, task, &self.registry, &mut self.economy)?;
        if built.area_completed {
            if let Some(next) = self.village.unlock_next_area(area, &self.registry) {
                self.events.emit(Event::AreaUnlocked { area: next, at: now });
                self.unlock_next_producer(now);
            }
        }
        Ok(built)
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance the session to `now`: fire due timers, then pop expired
    /// bubbles. The host calls this from its update loop.
    pub fn tick(&mut self, now: Millis) {
        for kind in self.scheduler.take_due(now) {
            self.handle_timer(kind, now);
        }
        self.pop_expired_bubbles(now);
    }

    fn handle_timer(&mut self, kind: TimerKind, now: Millis) {
        match kind {
            TimerKind::EnergyRegen => {
                self.energy
                    .regen_step(self.tuning.energy_regen_amount, now);
                self.scheduler.schedule(
                    now + self.tuning.energy_regen_interval_ms,
                    TimerKind::EnergyRegen,
                );
            }
            TimerKind::AutoProduce(producer) => {
                if !self.active_producers.contains(&producer) {
                    return;
                }
                let Some(ProducerKind::Auto { interval_ms }) =
                    self.registry.producer(producer).map(|d| d.kind)
                else {
                    return;
                };
                if let Some(emission) = self.producers.auto_tick(
                    producer,
                    &self.registry,
                    &mut self.grid,
                    &mut self.rng,
                    now,
                ) {
                    self.record_emission(producer, emission, now);
                }
                self.scheduler
                    .schedule(now + interval_ms, TimerKind::AutoProduce(producer));
            }
            TimerKind::OrderRefresh => {
                let chains = self.active_chains();
                self.orders.fill_empty(&chains, &mut self.rng);
                self.scheduler.schedule(
                    now + self.tuning.order_refresh_interval_ms,
                    TimerKind::OrderRefresh,
                );
            }
            TimerKind::OrderRespawn { slot } => {
                let chains = self.active_chains();
                self.orders.respawn_slot(slot, &chains, &mut self.rng);
            }
            TimerKind::FulfillPoll => {
                if !self.order_panel_open {
                    return;
                }
                self.check_fulfillment();
                self.scheduler
                    .schedule(now + self.tuning.fulfill_poll_ms, TimerKind::FulfillPoll);
            }
        }
    }

    /// Expired bubbles pop into their sell value.
    fn pop_expired_bubbles(&mut self, now: Millis) {
        for index in self.grid.expired_bubbles(now) {
            if let Some(item) = self.grid.take(index) {
                let coins = item.sell_value(self.tuning.sell_multiplier).unwrap_or(0);
                self.economy.add_coins(coins);
                self.events.emit(Event::BubblePopped {
                    index,
                    coins,
                    at: now,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// A full serializable snapshot of the session.
    pub fn snapshot(&self, now: Millis) -> SaveState {
        SaveState {
            version: crate::serialize::FORMAT_VERSION,
            grid: self.grid.to_cells(),
            cobwebs: self.grid.locked_coords(),
            energy_current: self.energy.current(),
            energy_last_regen: self.energy.last_regen(),
            economy: self.economy,
            producers: self.producers.states().clone(),
            unlocked_producers: self.unlocked_producers.clone(),
            active_producers: self.active_producers.clone(),
            orders: self.orders.slots().to_vec(),
            inventory_slots: self.inventory.slots(),
            inventory_items: self.inventory.items().to_vec(),
            village_completed: self.village.completed_tasks().clone(),
            unlocked_areas: self.village.unlocked_areas().to_vec(),
            collection: self.collection.clone(),
            specials: self.specials,
            stats: self.stats,
            rng: self.rng.clone(),
            saved_at: now,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn energy(&self) -> &EnergyPool {
        &self.energy
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn orders(&self) -> &OrderBoard {
        &self.orders
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn specials(&self) -> &SpecialItems {
        &self.specials
    }

    pub fn village(&self) -> &Village {
        &self.village
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn unlocked_producers(&self) -> &[ProducerId] {
        &self.unlocked_producers
    }

    pub fn active_producers(&self) -> &[ProducerId] {
        &self.active_producers
    }

    /// Buffer/cooldown summary for one producer, for the UI.
    pub fn producer_buffer_info(&self, producer: ProducerId, now: Millis) -> Option<BufferInfo> {
        self.producers.buffer_info(producer, &self.registry, now)
    }

    pub fn producer_state(&self, producer: ProducerId) -> Option<&crate::producer::ProducerState> {
        self.producers.state(producer)
    }

    /// The event bus; presentation layers drain it after each call.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Chains of the currently active producers, duplicates preserved
    /// (orders weight chains by how many active producers share them).
    fn active_chains(&self) -> Vec<ChainId> {
        let chains: Vec<ChainId> = self
            .active_producers
            .iter()
            .filter_map(|&id| self.registry.producer(id).map(|d| d.chain))
            .collect();
        if chains.is_empty() {
            vec![ChainId(0)]
        } else {
            chains
        }
    }

    fn record_emission(&mut self, producer: ProducerId, emission: Emission, now: Millis) {
        self.collection.record(emission.chain, emission.level);
        self.stats.items_produced += 1;
        self.events.emit(Event::Produced {
            producer,
            index: emission.index,
            chain: emission.chain,
            level: emission.level,
            at: now,
        });
    }

    fn record_merge(&mut self, outcome: &MergeOutcome, now: Millis) {
        for &(row, col) in &outcome.unlocked {
            self.events.emit(Event::CobwebUnlocked { row, col, at: now });
        }
        self.collection.record(outcome.chain, outcome.level);
        self.stats.merges += 1;
        if let Some(bubble) = outcome.bubble {
            self.events.emit(Event::BubbleSpawned {
                index: bubble.index,
                chain: bubble.chain,
                at: now,
            });
        }
        if outcome.bonus_coins > 0 {
            self.economy.add_coins(outcome.bonus_coins);
            self.events.emit(Event::HighTierBonus {
                level: outcome.level,
                coins: outcome.bonus_coins,
                at: now,
            });
        }
        self.events.emit(Event::Merged {
            index: outcome.index,
            chain: outcome.chain,
            level: outcome.level,
            at: now,
        });
    }

    /// Unlock a producer, place its marker, and start its timer if it is
    /// an auto producer.
    fn unlock_producer(&mut self, producer: ProducerId, now: Millis) {
        let Some(def) = self.registry.producer(producer) else {
            return;
        };
        let kind = def.kind;
        self.producers.unlock(producer, def);
        if !self.unlocked_producers.contains(&producer) {
            self.unlocked_producers.push(producer);
        }
        if self.active_producers.len() < self.tuning.active_producer_limit
            && !self.active_producers.contains(&producer)
        {
            self.active_producers.push(producer);
        }
        // A full board leaves the producer unlocked but off-grid; the load
        // path re-places it once space frees up.
        let _ = self
            .producers
            .place_on_grid(producer, &self.registry, &mut self.grid);
        if let ProducerKind::Auto { interval_ms } = kind {
            self.scheduler
                .schedule(now + interval_ms, TimerKind::AutoProduce(producer));
        }
    }

    /// Village progression: unlock the next producer in unlock order.
    fn unlock_next_producer(&mut self, now: Millis) {
        let next = self
            .registry
            .producers_by_unlock_order()
            .into_iter()
            .find(|id| !self.unlocked_producers.contains(id));
        if let Some(producer) = next {
            self.unlock_producer(producer, now);
            self.events.emit(Event::ProducerUnlocked { producer, at: now });
        }
    }

    /// After a load, make sure every active producer's marker is actually
    /// on the board and its back-reference points at it.
    fn ensure_markers_on_grid(&mut self) {
        for producer in self.active_producers.clone() {
            let placed = self
                .producers
                .state(producer)
                .and_then(|s| s.grid_index)
                .and_then(|index| self.grid.get(index).copied())
                .is_some_and(|item| item.as_marker() == Some(producer));
            if placed {
                continue;
            }
            // The save may hold the marker at a different cell; adopt it.
            let found = self
                .grid
                .occupied()
                .find(|(_, item)| item.as_marker() == Some(producer))
                .map(|(index, _)| index);
            match found {
                Some(index) => {
                    if let Some(state) = self.producers.state_mut(producer) {
                        state.grid_index = Some(index);
                    }
                }
                None => {
                    let _ = self
                        .producers
                        .place_on_grid(producer, &self.registry, &mut self.grid);
                }
            }
        }
    }

    /// Start the always-on timers (energy regen, order refresh).
    fn schedule_base_timers(&mut self, now: Millis) {
        self.scheduler.schedule(
            now + self.tuning.energy_regen_interval_ms,
            TimerKind::EnergyRegen,
        );
        self.scheduler.schedule(
            now + self.tuning.order_refresh_interval_ms,
            TimerKind::OrderRefresh,
        );
    }
}
