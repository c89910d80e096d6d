table! {
    career_sites (id) {
        id -> Int8,
        link -> Text,
        company_id -> Int8,
    }
}

table! {
    companies (id) {
        id -> Int8,
        name -> Text,
    }
}

table! {
    roles (id) {
        id -> Int8,
        name -> Text,
    }
}

table! {
    subscriptions (id) {
        id -> Int8,
        user_id -> Int8,
        company_id -> Int8,
        career_site_ids -> Array<Int8>,
        role_ids -> Array<Int8>,
        active -> Bool,
        interest_time -> Timestamptz,
        version -> Int8,
    }
}

table! {
    users (id) {
        id -> Int8,
        email -> Text,
    }
}

joinable!(career_sites -> companies (company_id));
joinable!(subscriptions -> companies (company_id));
joinable!(subscriptions -> users (user_id));

allow_tables_to_appear_in_same_query!(career_sites, companies, roles, subscriptions, users,);
