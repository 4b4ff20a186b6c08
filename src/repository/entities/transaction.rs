//! Transaction entity (spec §6 `transactions` table)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub station_id: String,
    pub connector_id: i32,
    pub id_tag: String,

    pub meter_start: i32,
    #[sea_orm(nullable)]
    pub meter_stop: Option<i32>,

    pub start_time: DateTimeUtc,
    #[sea_orm(nullable)]
    pub stop_time: Option<DateTimeUtc>,

    #[sea_orm(nullable)]
    pub reason: Option<String>,
    #[sea_orm(nullable)]
    pub reservation_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::StationId",
        to = "super::station::Column::Id"
    )]
    Station,
    #[sea_orm(has_many = "super::meter_sample::Entity")]
    MeterSamples,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl Related<super::meter_sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeterSamples.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
