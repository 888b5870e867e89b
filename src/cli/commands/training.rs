//! Training catalogue command handlers

use crate::config::Config;
use crate::db::Store;
use crate::models::training::NewTraining;
use crate::services::{SeaOrmTrainingService, TrainingError, TrainingService};

async fn training_service(config: &Config) -> anyhow::Result<SeaOrmTrainingService> {
    let store = Store::new(&config.general.database_url).await?;
    Ok(SeaOrmTrainingService::new(store))
}

pub async fn cmd_training_add(config: &Config, training: NewTraining) -> anyhow::Result<()> {
    let service = training_service(config).await?;

    match service.create(training).await {
        Ok(created) => {
            println!("✓ Added training: {}", created.title);
            println!("  ID: {}", created.id);
            Ok(())
        }
        Err(TrainingError::Validation(msg)) => anyhow::bail!("Cannot add training: {msg}"),
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_training_list(config: &Config, category: Option<&str>) -> anyhow::Result<()> {
    let service = training_service(config).await?;
    let trainings = service.list(category).await?;

    if trainings.is_empty() {
        println!("No trainings found.");
        println!();
        println!("Add one with: facegate training add \"title\" --category safety");
        return Ok(());
    }

    println!("Trainings ({} total)", trainings.len());
    println!("{:-<70}", "");

    for training in trainings {
        println!(
            "• {} [{} | {} min]",
            training.title, training.category, training.duration
        );
        println!("  ID: {}", training.id);
    }

    Ok(())
}

pub async fn cmd_training_remove(config: &Config, id: &str) -> anyhow::Result<()> {
    let service = training_service(config).await?;

    match service.remove(id).await {
        Ok(()) => println!("✓ Removed training {id}"),
        Err(TrainingError::NotFound) => println!("Training not found: {id}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> Config {
        let db_path =
            std::env::temp_dir().join(format!("facegate-cli-{}.db", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.general.database_url = format!("sqlite:{}", db_path.display());
        config
    }

    #[tokio::test]
    async fn add_rejects_blank_title() {
        let config = temp_config();
        let training = NewTraining {
            title: "   ".to_string(),
            category: "safety".to_string(),
            ..NewTraining::default()
        };

        let err = cmd_training_add(&config, training).await.unwrap_err();
        assert!(err.to_string().contains("Title is required"));

        let service = training_service(&config).await.unwrap();
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_then_remove() {
        let config = temp_config();
        let training = NewTraining {
            title: "Fire drill".to_string(),
            category: "safety".to_string(),
            duration: 30,
            ..NewTraining::default()
        };

        cmd_training_add(&config, training).await.unwrap();

        let service = training_service(&config).await.unwrap();
        let listed = service.list(Some("safety")).await.unwrap();
        assert_eq!(listed.len(), 1);

        cmd_training_remove(&config, &listed[0].id).await.unwrap();
        assert!(service.list(None).await.unwrap().is_empty());
    }
}
