//! User inspection command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_user_show(config: &Config, query: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_url).await?;

    let user = if query.contains('@') {
        store.get_user_by_email(&query.trim().to_lowercase()).await?
    } else {
        store.get_user(query.trim()).await?
    };

    let Some(user) = user else {
        println!("User not found: {query}");
        return Ok(());
    };

    println!("{} <{}>", user.name, user.email);
    println!("{:-<70}", "");
    println!("  ID:          {}", user.id);
    println!("  Employee ID: {}", user.employee_id);
    println!(
        "  Position:    {}",
        user.position.as_deref().unwrap_or("-")
    );
    println!(
        "  Company:     {}",
        user.company_name.as_deref().unwrap_or("-")
    );
    println!(
        "  Photo:       {}",
        user.profile_photo_url.as_deref().unwrap_or("-")
    );
    println!(
        "  Embedding:   {}",
        if user.face_embedding_id.is_some() {
            "enrolled"
        } else {
            "not enrolled"
        }
    );
    println!("  Registered:  {}", user.created_at);

    Ok(())
}
