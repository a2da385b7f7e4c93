use serde::Serialize;

/// What a like points at. Each kind has its own table with a
/// UNIQUE (user_id, target) constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeTarget {
    Post,
    Comment,
}

impl LikeTarget {
    pub(crate) fn table(self) -> &'static str {
        match self {
            LikeTarget::Post => "post_likes",
            LikeTarget::Comment => "comment_likes",
        }
    }

    pub(crate) fn column(self) -> &'static str {
        match self {
            LikeTarget::Post => "post_id",
            LikeTarget::Comment => "comment_id",
        }
    }

    pub(crate) fn parent_table(self) -> &'static str {
        match self {
            LikeTarget::Post => "posts",
            LikeTarget::Comment => "comments",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LikeTarget::Post => "Post",
            LikeTarget::Comment => "Comment",
        }
    }
}

/// State of a like after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LikeState {
    Liked,
    Unliked,
}
