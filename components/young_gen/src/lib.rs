//! Young Generation - Space layout for a generational copying collector
//!
//! This component provides:
//! - Eden and two survivor spaces laid out in one committed address range
//! - Growing and shrinking the committed range between collections
//! - Re-laying the spaces without moving live data in from-space
//! - Survivor role swapping after a scavenge
//! - Card table barrier that follows the committed range
//! - Hooks for full mark-compact and parallel compaction passes
//!
//! Addresses are plain `usize` values: the layout logic only does address
//! arithmetic and never touches the memory it describes.

pub mod card_table;
pub mod config;
pub mod error;
pub mod layout;
pub mod mark_sweep;
pub mod mem_region;
pub mod space;
pub mod virtual_space;
pub mod young_gen;

// Re-export main types
pub use card_table::{BarrierSet, CardTable, SharedBarrierSet};
pub use config::{YoungGenConfig, DEFAULT_ALIGNMENT};
pub use error::{ConfigError, InvariantViolation, LayoutError, Result};
pub use layout::{SpaceLayout, SpaceOrder};
pub use mark_sweep::{CompactionManager, FreeSpace, MarkSweep, MarkSweepDecorator, SpaceRole};
pub use mem_region::{MemRegion, HEAP_WORD_SIZE, K, M};
pub use space::{MutableSpace, ObjectRef, SpaceId};
pub use virtual_space::{BackingStore, ReservedSpace, VirtualSpace};
pub use young_gen::{GenerationChange, ResizeOutcome, SpaceLimits, SpacesOutcome, YoungGen};
