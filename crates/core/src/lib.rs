pub mod buffer;
pub mod color;
pub mod debounce;
pub mod pattern;
pub mod pattern_list;
pub mod result;
pub mod session;

pub use buffer::{Buffer, BufferError};
pub use color::Color;
pub use debounce::{
    DebounceAction, DebounceState, ModificationMask, ModifyDebouncer, TimerAction,
    DEFAULT_DEBOUNCE_DELAY,
};
pub use pattern::{bool_str, parse_bool, Pattern, SelectionScope};
pub use pattern_list::{PatternId, PatternList, SortKey, SortOrder};
pub use result::{PatternResult, ResultList};
pub use session::{
    AnalyseSession, BufferSearcher, PatternChange, PatternSearcher, Placement, ResultLine,
    SearchSummary,
};

pub use analyse_search::SearchMode;
