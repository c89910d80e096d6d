use crate::schema::{career_sites, companies, roles};

#[derive(Queryable)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

#[derive(Insertable)]
#[table_name = "companies"]
pub struct NewCompany<'a> {
    pub name: &'a str,
}

#[derive(Insertable)]
#[table_name = "career_sites"]
pub struct NewCareerSite<'a> {
    pub link: &'a str,
    pub company_id: i64,
}

#[derive(Insertable)]
#[table_name = "roles"]
pub struct NewRole<'a> {
    pub name: &'a str,
}
