//! SeaORM entity models
//!
//! Database entities for Arthub

mod analytics_event;
mod artist_profile;
mod artwork;
mod artwork_like;
mod comment;
mod comment_like;
mod connection;
mod notification;
mod order;
mod post;
mod post_like;
mod review;
mod types;
mod user;

pub use types::{ShippingAddress, StringList};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};

pub use artist_profile::{
    Entity as ArtistProfileEntity,
    Model as ArtistProfile,
    ActiveModel as ArtistProfileActiveModel,
    Column as ArtistProfileColumn,
};

pub use artwork::{
    Entity as ArtworkEntity,
    Model as Artwork,
    ActiveModel as ArtworkActiveModel,
    Column as ArtworkColumn,
    ArtworkStatus,
    Medium,
    Style,
};

pub use artwork_like::{
    Entity as ArtworkLikeEntity,
    ActiveModel as ArtworkLikeActiveModel,
    Column as ArtworkLikeColumn,
};

pub use order::{
    Entity as OrderEntity,
    Model as Order,
    ActiveModel as OrderActiveModel,
    Column as OrderColumn,
    OrderStatus,
    PaymentMethod,
    PaymentStatus,
};

pub use review::{
    Entity as ReviewEntity,
    Model as Review,
    ActiveModel as ReviewActiveModel,
    Column as ReviewColumn,
};

pub use connection::{
    Entity as ConnectionEntity,
    Model as Connection,
    ActiveModel as ConnectionActiveModel,
    Column as ConnectionColumn,
    ConnectionStatus,
    ConnectionType,
};

pub use post::{
    Entity as PostEntity,
    Model as Post,
    ActiveModel as PostActiveModel,
    Column as PostColumn,
    PostCategory,
};

pub use post_like::{
    Entity as PostLikeEntity,
    ActiveModel as PostLikeActiveModel,
    Column as PostLikeColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use comment_like::{
    Entity as CommentLikeEntity,
    ActiveModel as CommentLikeActiveModel,
    Column as CommentLikeColumn,
};

pub use analytics_event::{
    Entity as AnalyticsEventEntity,
    Model as AnalyticsEvent,
    ActiveModel as AnalyticsEventActiveModel,
    Column as AnalyticsEventColumn,
};

pub use notification::{
    Entity as NotificationEntity,
    Model as Notification,
    ActiveModel as NotificationActiveModel,
    Column as NotificationColumn,
    NotificationKind,
};
