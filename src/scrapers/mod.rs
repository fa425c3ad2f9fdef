pub mod browser;
pub mod detail;
pub mod page;
pub mod search;
pub mod traits;

pub use browser::ChromeDriver;
pub use detail::DetailExtractor;
pub use page::Page;
pub use search::SearchCrawler;
pub use traits::PageDriver;
