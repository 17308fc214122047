pub const VIEW_ACTORS: &str = "view:actors";
pub const POST_ACTORS: &str = "post:actors";
pub const PATCH_ACTORS: &str = "patch:actors";
pub const DELETE_ACTORS: &str = "delete:actors";
pub const VIEW_MOVIES: &str = "view:movies";
pub const POST_MOVIES: &str = "post:movies";
pub const PATCH_MOVIES: &str = "patch:movies";
pub const DELETE_MOVIES: &str = "delete:movies";

pub const CASTING_ASSISTANT: &[&str] = &[VIEW_ACTORS, VIEW_MOVIES];

pub const CASTING_DIRECTOR: &[&str] = &[
    VIEW_ACTORS,
    VIEW_MOVIES,
    POST_ACTORS,
    PATCH_ACTORS,
    DELETE_ACTORS,
    PATCH_MOVIES,
];

pub const EXECUTIVE_PRODUCER: &[&str] = &[
    VIEW_ACTORS,
    VIEW_MOVIES,
    POST_ACTORS,
    PATCH_ACTORS,
    DELETE_ACTORS,
    POST_MOVIES,
    PATCH_MOVIES,
    DELETE_MOVIES,
];
