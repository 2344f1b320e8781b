pub mod article;
pub mod category;
pub mod filter;
pub mod loading;
pub mod source;

pub use article::{Article, SourceRef, TimeAgo};
pub use category::{NewsCategory, SortBy};
pub use filter::DateFilter;
pub use loading::{FailureKind, LoadingState};
pub use source::NewsSource;
