//! Mapped records shared by the unit tests, written the way
//! `#[derive(Table)]` expands them.

use crate::schema::{
    Column, ColumnDescriptor, ColumnId, Mapped, Record, SchemaRegistry, TableDescriptor,
};
use crate::value::Bindable;

pub struct User {
    pub id: i64,
    pub name: String,
    pub grade: i64,
    pub email: Option<String>,
}

impl Mapped for User {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("users")
            .key_column(ColumnDescriptor::of::<i64>("id", "id"))
            .column(ColumnDescriptor::of::<String>("name", "name"))
            .column(ColumnDescriptor::of::<i64>("grade", "grade"))
            .column(ColumnDescriptor::of::<Option<String>>("email", "email"))
    }
}

impl Record for User {
    fn values(&self) -> Vec<(ColumnId, Bindable)> {
        vec![
            ("id", Bindable::new(self.id)),
            ("name", Bindable::new(self.name.clone())),
            ("grade", Bindable::new(self.grade)),
            ("email", Bindable::new(self.email.clone())),
        ]
    }
}

#[allow(non_snake_case)]
pub mod UserColumns {
    use super::{Column, User};

    macro_rules! column {
        ($name:ident, $member:literal, $ty:ty) => {
            pub struct $name;

            impl Column for $name {
                type Table = User;
                type Type = $ty;
                const MEMBER: &'static str = $member;
            }
        };
    }

    column!(Id, "id", i64);
    column!(Name, "name", String);
    column!(Grade, "grade", i64);
    column!(Email, "email", Option<String>);
}

pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub score: f64,
}

impl Mapped for Post {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("posts")
            .key_column(ColumnDescriptor::of::<i64>("id", "id"))
            .column(ColumnDescriptor::of::<i64>("user_id", "user_id"))
            .column(ColumnDescriptor::of::<String>("title", "title"))
            .column(ColumnDescriptor::of::<f64>("score", "score"))
    }
}

impl Record for Post {
    fn values(&self) -> Vec<(ColumnId, Bindable)> {
        vec![
            ("id", Bindable::new(self.id)),
            ("user_id", Bindable::new(self.user_id)),
            ("title", Bindable::new(self.title.clone())),
            ("score", Bindable::new(self.score)),
        ]
    }
}

#[allow(non_snake_case)]
pub mod PostColumns {
    use super::{Column, Post};

    macro_rules! column {
        ($name:ident, $member:literal, $ty:ty) => {
            pub struct $name;

            impl Column for $name {
                type Table = Post;
                type Type = $ty;
                const MEMBER: &'static str = $member;
            }
        };
    }

    column!(Id, "id", i64);
    column!(UserId, "user_id", i64);
    column!(Title, "title", String);
    column!(Score, "score", f64);
}

/// Composite primary key, never auto-assigned.
pub struct Membership {
    pub user_id: i64,
    pub group_id: i64,
}

impl Mapped for Membership {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("memberships")
            .key_column(ColumnDescriptor::of::<i64>("user_id", "user_id"))
            .key_column(ColumnDescriptor::of::<i64>("group_id", "group_id"))
    }
}

impl Record for Membership {
    fn values(&self) -> Vec<(ColumnId, Bindable)> {
        vec![
            ("user_id", Bindable::new(self.user_id)),
            ("group_id", Bindable::new(self.group_id)),
        ]
    }
}

/// Never registered.
pub struct Orphan;

impl Mapped for Orphan {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("orphans")
    }
}

pub fn schema() -> SchemaRegistry {
    SchemaRegistry::builder()
        .register_keyed::<User>()
        .register_keyed::<Post>()
        .register_keyed::<Membership>()
        .build()
        .unwrap()
}
