use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub previous_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub on_offer: bool,
    /// `disponible` or `agotado`.
    pub availability: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    #[sea_orm(column_name = "image_2")]
    pub image_2: Option<String>,
    #[sea_orm(column_name = "image_3")]
    pub image_3: Option<String>,
    #[sea_orm(column_name = "image_4")]
    pub image_4: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
