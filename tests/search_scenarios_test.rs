use breed_registry::core::filter::FilterForm;
use breed_registry::core::search::{PageCount, SearchSession, SearchState};
use breed_registry::domain::model::{Breeder, Collection, Color, Dog, GeoPoint, Sex};
use breed_registry::{compose_filters, InMemoryRepository, RawFilters, SessionContext};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn dog(id: usize, sex: Sex, color: Color) -> Dog {
    Dog {
        id: format!("dog-{id:02}"),
        given_name: Some(format!("Dog {id:02}")),
        full_kennel_name: Some(format!("Dog {id:02} vom Teich")),
        sex: Some(sex),
        color: Some(color),
        ..Default::default()
    }
}

/// 12 black females, 3 black males and 2 blond females.
fn registry() -> InMemoryRepository {
    let mut dogs: Vec<Dog> = (0..12).map(|i| dog(i, Sex::Female, Color::Black)).collect();
    dogs.extend((12..15).map(|i| dog(i, Sex::Male, Color::Black)));
    dogs.extend((15..17).map(|i| dog(i, Sex::Female, Color::Blond)));
    InMemoryRepository::new().with_dogs(dogs)
}

#[tokio::test]
async fn test_female_black_dogs_first_page() {
    let raw = RawFilters {
        sex: "F".to_string(),
        color: "S".to_string(),
        page: "1".to_string(),
        page_size: "10".to_string(),
        ..Default::default()
    };
    let mut session: SearchSession<_, Dog> = SearchSession::new(Arc::new(registry()));

    let state = session
        .search(compose_filters(Collection::Dogs, &raw), &SessionContext::anonymous())
        .await;

    assert_eq!(state, SearchState::Success);
    assert_eq!(session.results().len(), 10);
    assert_eq!(session.total(), Some(12));
    assert_eq!(session.page_count(), Some(PageCount::Exact(2)));
    assert!(session
        .results()
        .iter()
        .all(|hit| hit.entity.sex == Some(Sex::Female) && hit.entity.color == Some(Color::Black)));
}

#[tokio::test]
async fn test_second_page_holds_the_remainder() {
    let mut form = FilterForm::new(Collection::Dogs);
    form.update(|raw| {
        raw.sex = "F".to_string();
        raw.color = "S".to_string();
    });
    form.set_page(2);

    let mut session: SearchSession<_, Dog> = SearchSession::new(Arc::new(registry()));
    session
        .search(form.request(), &SessionContext::anonymous())
        .await;

    assert_eq!(session.results().len(), 2);
    assert_eq!(session.results()[0].entity.id, "dog-10");
}

#[tokio::test]
async fn test_caller_clamps_page_after_result_set_shrinks() {
    let repo = Arc::new(registry());
    let mut form = FilterForm::new(Collection::Dogs);
    form.set_page(2);

    let mut session: SearchSession<_, Dog> = SearchSession::new(repo);
    session
        .search(form.request(), &SessionContext::anonymous())
        .await;
    assert_eq!(session.page_count(), Some(PageCount::Exact(2)));

    // Narrowing the filters re-anchors at page 1 on its own.
    form.update(|raw| raw.color = "B".to_string());
    assert_eq!(form.pagination().page, 1);

    // An explicit page jump beyond the new count is the caller's to clamp.
    form.set_page(5);
    session
        .search(form.request(), &SessionContext::anonymous())
        .await;
    assert!(session.results().is_empty());
    let pages = session.page_count().unwrap().value();
    form.clamp_page(pages);
    assert_eq!(form.pagination().page, 1);
}

#[tokio::test]
async fn test_fixture_file_with_locations() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
            "breeders": [
                { "documentId": "b1", "kennelName": "vom Teich", "isActive": true,
                  "GeoLocation": { "lat": 48.0, "lng": 11.0 } },
                { "documentId": "b2", "kennelName": "am Spreeufer", "isActive": true,
                  "member": { "firstName": "Ute", "Location": { "lat": "52.1", "lng": "13.1" } } },
                { "documentId": "b3", "kennelName": "ohne Ort", "isActive": true }
            ]
        }"#,
    )
    .unwrap();

    let repo = InMemoryRepository::from_json_file(file.path()).unwrap();
    let raw = RawFilters {
        max_distance: "300".to_string(),
        ..Default::default()
    };
    let mut session = SearchSession::<_, Breeder>::new(Arc::new(repo))
        .with_origin(GeoPoint::new(52.0, 13.0));
    session
        .search(
            compose_filters(Collection::Breeders, &raw),
            &SessionContext::anonymous(),
        )
        .await;

    let hits = session.results();
    assert_eq!(hits.len(), 3);
    // Sorted by kennel name: "am Spreeufer", "ohne Ort", "vom Teich".
    assert_eq!(hits[0].proximity.display_km(), Some(13));
    assert_eq!(hits[1].proximity.distance_km, None);
    assert!(!hits[1].proximity.exceeded);
    assert!(hits[2].proximity.exceeded);
}
