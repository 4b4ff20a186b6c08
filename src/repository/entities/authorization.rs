//! Authorization (id tag) entity (spec §6 `authorizations` table)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "authorizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id_tag: String,

    /// Accepted, Blocked, Expired, Invalid, ConcurrentTx
    pub status: String,
    #[sea_orm(nullable)]
    pub expiry_date: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub parent_id_tag: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
