pub mod article;
pub mod interaction;
pub mod pagination;
pub mod user;

pub use article::{
    Article, ArticleCounter, ArticleFilter, ArticleQuery, ArticleSort, CreateArticleRequest,
    NewArticle,
};
pub use interaction::{
    CreateInteractionRequest, Interaction, InteractionFilter, InteractionType,
};
pub use pagination::{ListArticlesQuery, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use user::{CreateUserRequest, NewUser, User};
