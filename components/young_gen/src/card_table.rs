//! Card table write barrier.
//!
//! The heap is divided into fixed-size cards; a write of a reference into a
//! card marks it dirty so the next scavenge only scans dirty cards for
//! old-to-young pointers. The table covers one region per generation and
//! must follow every change of a generation's committed range.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::mem_region::{align_up, MemRegion};

/// Default card size in bytes.
pub const DEFAULT_CARD_SIZE: usize = 512;

/// The part of the write barrier the young generation talks to.
pub trait BarrierSet {
    /// Makes the barrier cover `region` from now on.
    ///
    /// `region.start()` identifies which covered region is being resized;
    /// an unknown start adds a new covered region.
    fn resize_covered_region(&mut self, region: MemRegion);
}

/// A barrier set shared by every generation of the heap.
pub type SharedBarrierSet = Arc<Mutex<dyn BarrierSet + Send>>;

/// Card table covering one region.
#[derive(Debug, Clone)]
struct CoveredCards {
    region: MemRegion,
    /// Dirty bit per card
    cards: Vec<bool>,
}

/// Card table for efficient write barrier checking.
///
/// Card indices are global: cards of later covered regions follow the cards
/// of earlier ones, in the order the regions were first covered.
#[derive(Debug, Clone)]
pub struct CardTable {
    covered: Vec<CoveredCards>,
    card_size: usize,
}

impl CardTable {
    /// Creates a card table with no covered regions.
    ///
    /// # Panics
    ///
    /// Panics if `card_size` is not a power of two.
    pub fn new(card_size: usize) -> Self {
        assert!(
            card_size.is_power_of_two(),
            "card size {} is not a power of two",
            card_size
        );
        CardTable {
            covered: Vec::new(),
            card_size,
        }
    }

    /// Creates a card table with default 512-byte cards.
    pub fn with_default_card_size() -> Self {
        Self::new(DEFAULT_CARD_SIZE)
    }

    /// Wraps the table for sharing between generations.
    pub fn into_shared(self) -> Arc<Mutex<CardTable>> {
        Arc::new(Mutex::new(self))
    }

    fn cards_for(&self, region: &MemRegion) -> usize {
        align_up(region.byte_size(), self.card_size) / self.card_size
    }

    /// Locates `address`: covered region index and card index within it.
    fn locate(&self, address: usize) -> Option<(usize, usize)> {
        self.covered
            .iter()
            .position(|covered| covered.region.contains(address))
            .map(|idx| {
                let region = &self.covered[idx].region;
                (idx, (address - region.start()) / self.card_size)
            })
    }

    /// Index of the first card of covered region `idx`.
    fn first_card(&self, idx: usize) -> usize {
        self.covered[..idx].iter().map(|c| c.cards.len()).sum()
    }

    /// Marks the card containing `address` as dirty.
    ///
    /// # Returns
    ///
    /// True if the address is covered by the table.
    pub fn mark_dirty(&mut self, address: usize) -> bool {
        match self.locate(address) {
            Some((idx, card)) => {
                self.covered[idx].cards[card] = true;
                true
            }
            None => false,
        }
    }

    /// Returns the global card index for `address`.
    pub fn address_to_card(&self, address: usize) -> Option<usize> {
        self.locate(address)
            .map(|(idx, card)| self.first_card(idx) + card)
    }

    fn card_slot(&self, card_index: usize) -> Option<(usize, usize)> {
        let mut remaining = card_index;
        for (idx, covered) in self.covered.iter().enumerate() {
            if remaining < covered.cards.len() {
                return Some((idx, remaining));
            }
            remaining -= covered.cards.len();
        }
        None
    }

    /// Returns true if the card at `card_index` is dirty.
    pub fn is_dirty(&self, card_index: usize) -> bool {
        self.card_slot(card_index)
            .map(|(idx, card)| self.covered[idx].cards[card])
            .unwrap_or(false)
    }

    /// Clears the dirty bit of one card.
    pub fn clear_card(&mut self, card_index: usize) {
        if let Some((idx, card)) = self.card_slot(card_index) {
            self.covered[idx].cards[card] = false;
        }
    }

    /// Clears every dirty bit.
    pub fn clear_all(&mut self) {
        for covered in &mut self.covered {
            covered.cards.iter_mut().for_each(|card| *card = false);
        }
    }

    /// Returns the global indices of all dirty cards.
    pub fn dirty_cards(&self) -> Vec<usize> {
        self.covered
            .iter()
            .flat_map(|covered| covered.cards.iter())
            .enumerate()
            .filter_map(|(idx, &dirty)| if dirty { Some(idx) } else { None })
            .collect()
    }

    /// Returns the address range covered by a card.
    pub fn card_range(&self, card_index: usize) -> Option<MemRegion> {
        let (idx, card) = self.card_slot(card_index)?;
        let region = &self.covered[idx].region;
        let start = region.start() + card * self.card_size;
        let end = (start + self.card_size).min(region.end());
        Some(MemRegion::new(start, end))
    }

    /// Total number of cards across every covered region.
    pub fn num_cards(&self) -> usize {
        self.covered.iter().map(|c| c.cards.len()).sum()
    }

    pub fn card_size(&self) -> usize {
        self.card_size
    }

    /// The covered regions in the order they were first covered.
    pub fn covered_regions(&self) -> Vec<MemRegion> {
        self.covered.iter().map(|c| c.region).collect()
    }

    /// The covered region starting at `start`, if any.
    pub fn covered_region_at(&self, start: usize) -> Option<MemRegion> {
        self.covered
            .iter()
            .find(|c| c.region.start() == start)
            .map(|c| c.region)
    }
}

impl BarrierSet for CardTable {
    fn resize_covered_region(&mut self, region: MemRegion) {
        let card_count = self.cards_for(&region);
        match self
            .covered
            .iter_mut()
            .find(|c| c.region.start() == region.start())
        {
            Some(covered) => {
                // Cards that stay covered keep their dirty bits.
                covered.cards.resize(card_count, false);
                log::debug!(
                    "card table: covered region {} -> {} ({} cards)",
                    covered.region,
                    region,
                    card_count
                );
                covered.region = region;
            }
            None => {
                log::debug!(
                    "card table: covering {} ({} cards)",
                    region,
                    card_count
                );
                self.covered.push(CoveredCards {
                    region,
                    cards: vec![false; card_count],
                });
            }
        }
    }
}
