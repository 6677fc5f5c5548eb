use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{EventId, StoreId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no page at {path}")]
pub struct RouteError {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", content = "id", rename_all = "camelCase")]
pub enum Route {
    #[default]
    Home,
    Search,
    StoreDetail(StoreId),
    Explore,
    Guide,
    MyPage,
    OrderStatus,
    Map,
    EventDetail(EventId),
    NotFound(String),
}

impl Route {
    /// Never fails: unknown paths become [`Route::NotFound`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        path.parse()
            .unwrap_or_else(|e: RouteError| Self::NotFound(e.path))
    }

    /// Pages that show the store map and its sheet.
    #[must_use]
    pub const fn shows_map(&self) -> bool {
        matches!(self, Self::Search | Self::Map)
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = bare.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        let route = match segments.as_slice() {
            [] | [""] => Self::Home,
            ["search"] => Self::Search,
            ["explore"] => Self::Explore,
            ["guide"] => Self::Guide,
            ["mypage"] => Self::MyPage,
            ["order-status"] => Self::OrderStatus,
            ["map"] => Self::Map,
            ["store", id] if !id.is_empty() => Self::StoreDetail(StoreId::new(*id)),
            ["event", id] if !id.is_empty() => Self::EventDetail(EventId::new(*id)),
            _ => {
                return Err(RouteError {
                    path: path.to_string(),
                })
            }
        };

        if !bare.starts_with('/') && !bare.is_empty() {
            return Err(RouteError {
                path: path.to_string(),
            });
        }
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Search => f.write_str("/search"),
            Self::StoreDetail(id) => write!(f, "/store/{id}"),
            Self::Explore => f.write_str("/explore"),
            Self::Guide => f.write_str("/guide"),
            Self::MyPage => f.write_str("/mypage"),
            Self::OrderStatus => f.write_str("/order-status"),
            Self::Map => f.write_str("/map"),
            Self::EventDetail(id) => write!(f, "/event/{id}"),
            Self::NotFound(path) => f.write_str(path),
        }
    }
}
