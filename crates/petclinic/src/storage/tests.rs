//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Storage tests
//!
//! Every scenario runs against both backends.

use chrono::{NaiveDate, TimeZone, Utc};

use super::*;
use crate::error::ClinicError;
use crate::model::Contact;

fn contact(email: &str, state: &str) -> Contact {
    Contact {
        email: email.to_string(),
        first_name: "Jean".to_string(),
        last_name: "Coleman".to_string(),
        street_address: "105 N. Lake St.".to_string(),
        city: "Monona".to_string(),
        state: state.to_string(),
        telephone: "6085552654".to_string(),
    }
}

fn new_pet(owner: EntityId, pet_type: Option<EntityId>) -> NewPet {
    NewPet {
        name: "Samantha".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2018, 9, 6).unwrap(),
        owner,
        pet_type,
    }
}

fn new_visit(pet: EntityId) -> NewVisit {
    NewVisit {
        visit_date: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        description: "rabies shot".to_string(),
        pet,
    }
}

async fn sqlite() -> SqliteStore {
    SqliteStore::in_memory().await.unwrap()
}

async fn check_owner_crud(store: &dyn ClinicStore) {
    let owner = store
        .insert_owner(NewOwner {
            contact: contact("jean@example.com", "WI"),
        })
        .await
        .unwrap();
    assert_eq!(owner.id, 1);

    let fetched = store.get_owner(owner.id).await.unwrap().unwrap();
    assert_eq!(fetched, owner);

    let mut changed = fetched.clone();
    changed.contact.city = "Madison".to_string();
    store.update_owner(changed.clone()).await.unwrap();
    assert_eq!(store.get_owner(owner.id).await.unwrap().unwrap(), changed);

    assert!(store.delete_owner(owner.id).await.unwrap());
    assert!(!store.delete_owner(owner.id).await.unwrap());
    assert!(store.get_owner(owner.id).await.unwrap().is_none());

    let missing = store.update_owner(changed).await;
    assert!(matches!(missing, Err(ClinicError::NotFound { .. })));
}

async fn check_unique_email(store: &dyn ClinicStore) {
    store
        .insert_owner(NewOwner {
            contact: contact("dup@example.com", "CA"),
        })
        .await
        .unwrap();
    let second = store
        .insert_owner(NewOwner {
            contact: contact("dup@example.com", "TX"),
        })
        .await;
    match second {
        Err(ClinicError::Validation(errors)) => {
            assert_eq!(
                errors.get("email").unwrap()[0],
                "owner with this email already exists."
            );
        }
        other => panic!("expected a validation error, got {:?}", other),
    }

    // Owners and vets are separate namespaces
    store
        .insert_vet(NewVet {
            contact: contact("dup@example.com", "CA"),
            specialty: None,
        })
        .await
        .unwrap();

    assert!(store
        .is_taken(EntityKind::Owner, "dup@example.com", None)
        .await
        .unwrap());
    assert!(!store
        .is_taken(EntityKind::Owner, "dup@example.com", Some(1))
        .await
        .unwrap());
}

async fn check_state_filter(store: &dyn ClinicStore) {
    for (email, state) in [("a@example.com", "CA"), ("b@example.com", "TX"), ("c@example.com", "CA")] {
        store
            .insert_owner(NewOwner {
                contact: contact(email, state),
            })
            .await
            .unwrap();
    }
    let filter = OwnerFilter {
        state: Some("CA".to_string()),
    };
    let owners = store.list_owners(&filter).await.unwrap();
    let emails: Vec<_> = owners.iter().map(|o| o.email()).collect();
    assert_eq!(emails, vec!["a@example.com", "c@example.com"]);

    let lower = OwnerFilter {
        state: Some("ca".to_string()),
    };
    assert!(store.list_owners(&lower).await.unwrap().is_empty());
    assert_eq!(store.list_owners(&OwnerFilter::default()).await.unwrap().len(), 3);

    for (email, state) in [("v1@example.com", "TX"), ("v2@example.com", "CA"), ("v3@example.com", "TX")] {
        store
            .insert_vet(NewVet {
                contact: contact(email, state),
                specialty: None,
            })
            .await
            .unwrap();
    }
    let filter = VetFilter {
        state: Some("TX".to_string()),
    };
    let vets = store.list_vets(&filter).await.unwrap();
    let emails: Vec<_> = vets.iter().map(|v| v.email()).collect();
    assert_eq!(emails, vec!["v1@example.com", "v3@example.com"]);

    let missing = VetFilter {
        state: Some("WI".to_string()),
    };
    assert!(store.list_vets(&missing).await.unwrap().is_empty());
    assert_eq!(store.list_vets(&VetFilter::default()).await.unwrap().len(), 3);
}

async fn check_owner_cascade(store: &dyn ClinicStore) {
    let owner = store
        .insert_owner(NewOwner {
            contact: contact("cascade@example.com", "WI"),
        })
        .await
        .unwrap();
    let pets = store
        .insert_pets(vec![new_pet(owner.id, None), new_pet(owner.id, None)])
        .await
        .unwrap();
    assert_eq!(pets.len(), 2);
    store.insert_visits(vec![new_visit(pets[0].id)]).await.unwrap();

    assert!(store.delete_owner(owner.id).await.unwrap());
    assert!(store.list_pets(None).await.unwrap().is_empty());
    assert!(store.list_visits(None).await.unwrap().is_empty());
}

async fn check_lookup_delete_clears_references(store: &dyn ClinicStore) {
    let dog = store.insert_pet_type(NamedEntry::new("dog")).await.unwrap();
    let surgery = store
        .insert_specialty(NamedEntry::new("surgery"))
        .await
        .unwrap();
    let owner = store
        .insert_owner(NewOwner {
            contact: contact("lookup@example.com", "WI"),
        })
        .await
        .unwrap();
    let pet = store
        .insert_pets(vec![new_pet(owner.id, Some(dog.id))])
        .await
        .unwrap()
        .remove(0);
    let vet = store
        .insert_vet(NewVet {
            contact: contact("vet@example.com", "WI"),
            specialty: Some(surgery.id),
        })
        .await
        .unwrap();

    assert!(store.delete_pet_type(dog.id).await.unwrap());
    assert!(store.delete_specialty(surgery.id).await.unwrap());

    let pet = store.get_pet(pet.id).await.unwrap().unwrap();
    assert_eq!(pet.pet_type, None);
    let vet = store.get_vet(vet.id).await.unwrap().unwrap();
    assert_eq!(vet.specialty, None);
}

async fn check_batch_is_atomic(store: &dyn ClinicStore) {
    let owner = store
        .insert_owner(NewOwner {
            contact: contact("batch@example.com", "WI"),
        })
        .await
        .unwrap();
    let result = store
        .insert_pets(vec![new_pet(owner.id, None), new_pet(owner.id, Some(99))])
        .await;
    match result {
        Err(ClinicError::Validation(errors)) => assert_eq!(
            errors.get("pet_type").unwrap()[0],
            "Invalid pk \"99\" - object does not exist."
        ),
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert!(store.list_pets(Some(owner.id)).await.unwrap().is_empty());
}

async fn check_ids_not_reused(store: &dyn ClinicStore) {
    let first = store.insert_pet_type(NamedEntry::new("cat")).await.unwrap();
    let second = store.insert_pet_type(NamedEntry::new("bird")).await.unwrap();
    assert!(store.delete_pet_type(second.id).await.unwrap());
    let third = store.insert_pet_type(NamedEntry::new("fish")).await.unwrap();
    assert!(first.id < second.id);
    assert!(third.id > second.id);

    let names: Vec<_> = store
        .list_pet_types()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["cat", "fish"]);
}

async fn check_visits_by_pet(store: &dyn ClinicStore) {
    let owner = store
        .insert_owner(NewOwner {
            contact: contact("visits@example.com", "WI"),
        })
        .await
        .unwrap();
    let pets = store
        .insert_pets(vec![new_pet(owner.id, None), new_pet(owner.id, None)])
        .await
        .unwrap();
    store
        .insert_visits(vec![new_visit(pets[0].id), new_visit(pets[1].id), new_visit(pets[0].id)])
        .await
        .unwrap();

    let visits = store.list_visits(Some(pets[0].id)).await.unwrap();
    assert_eq!(visits.len(), 2);
    assert!(visits.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(visits[0].visit_date, new_visit(0).visit_date);

    assert!(store.delete_pet(pets[0].id).await.unwrap());
    assert_eq!(store.list_visits(None).await.unwrap().len(), 1);

    let stats = store.get_stats().await.unwrap();
    assert_eq!(stats.owners, 1);
    assert_eq!(stats.pets, 1);
    assert_eq!(stats.visits, 1);
    assert_eq!(stats.total(), 3);
}

async fn check_exists(store: &dyn ClinicStore) {
    let specialty = store
        .insert_specialty(NamedEntry::new("dentistry"))
        .await
        .unwrap();
    assert!(store
        .exists(EntityKind::Specialty, specialty.id)
        .await
        .unwrap());
    assert!(!store.exists(EntityKind::Specialty, 42).await.unwrap());
    assert!(!store.exists(EntityKind::Owner, specialty.id).await.unwrap());
    assert!(store.health_check().await.unwrap());
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_crud() {
        check_owner_crud(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_unique_email() {
        check_unique_email(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_state_filter() {
        check_state_filter(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_owner_cascade() {
        check_owner_cascade(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_lookup_delete_clears_references() {
        check_lookup_delete_clears_references(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        check_batch_is_atomic(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_ids_not_reused() {
        check_ids_not_reused(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_visits_by_pet() {
        check_visits_by_pet(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_exists() {
        check_exists(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_missing_reference_names_field() {
        let store = MemoryStore::new();
        let result = store
            .insert_vet(NewVet {
                contact: contact("vet@example.com", "WI"),
                specialty: Some(7),
            })
            .await;
        match result {
            Err(ClinicError::Validation(errors)) => assert_eq!(
                errors.get("specialty").unwrap()[0],
                "Invalid pk \"7\" - object does not exist."
            ),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod sqlite_tests {
    use super::*;
    use crate::config::SqliteConfig;

    #[tokio::test]
    async fn test_owner_crud() {
        check_owner_crud(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_unique_email() {
        check_unique_email(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_state_filter() {
        check_state_filter(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_owner_cascade() {
        check_owner_cascade(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_lookup_delete_clears_references() {
        check_lookup_delete_clears_references(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        check_batch_is_atomic(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_ids_not_reused() {
        check_ids_not_reused(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_visits_by_pet() {
        check_visits_by_pet(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_exists() {
        check_exists(&sqlite().await).await;
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteConfig {
            database_path: dir.path().join("clinic.db"),
            ..SqliteConfig::default()
        };

        let store = SqliteStore::new(&config).await.unwrap();
        store.insert_pet_type(NamedEntry::new("dog")).await.unwrap();
        store.shutdown().await.unwrap();

        let reopened = SqliteStore::new(&config).await.unwrap();
        let types = reopened.list_pet_types().await.unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "dog");
        assert_eq!(reopened.database_path(), Some(&config.database_path));
    }
}
