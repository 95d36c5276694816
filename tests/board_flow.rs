use kiseki_core::{
    ApplicationId, ApplicationService, ApplicationStatus, BoardConfig, ConfigStore, DragGesture,
    DropOutcome, Edge, InMemoryService, JobApplication, Kanban, NewApplication,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn card(id: &str, status: ApplicationStatus, position: &str) -> JobApplication {
    JobApplication::new(
        ApplicationId::from(id),
        NewApplication::new("Acme", id, status).with_position(position),
    )
}

async fn loaded_board(
    service: Arc<InMemoryService>,
    seed: Vec<JobApplication>,
) -> Kanban<InMemoryService> {
    service.seed(seed).await;
    let kanban = Kanban::new(service, BoardConfig::default()).unwrap();
    kanban.load().await.unwrap();
    kanban
}

async fn column_ids(kanban: &Kanban<InMemoryService>, status: ApplicationStatus) -> Vec<String> {
    kanban
        .columns()
        .await
        .into_iter()
        .find(|view| view.column.status == status)
        .map(|view| view.applications.iter().map(|app| app.id.to_string()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_drag_to_other_column_reconciles_with_server() {
    let service = Arc::new(InMemoryService::new());
    let kanban = loaded_board(
        Arc::clone(&service),
        vec![
            card("X", ApplicationStatus::Applied, "a0"),
            card("Y", ApplicationStatus::Applied, "a1"),
            card("Z", ApplicationStatus::Applied, "a2"),
        ],
    )
    .await;

    let outcome = kanban
        .drop_card(&DragGesture::onto_column("Y", ApplicationStatus::Offer))
        .await
        .unwrap();

    assert!(matches!(outcome, DropOutcome::Moved(ref app) if app.position == "a0"));
    assert_eq!(column_ids(&kanban, ApplicationStatus::Applied).await, vec!["X", "Z"]);
    assert_eq!(column_ids(&kanban, ApplicationStatus::Offer).await, vec!["Y"]);

    let server = service.get(&ApplicationId::from("Y")).await.unwrap();
    assert_eq!(server.status, ApplicationStatus::Offer);
    assert_eq!(server.position, "a0");
}

#[tokio::test]
async fn test_reorder_within_column_touches_one_card() {
    let service = Arc::new(InMemoryService::new());
    let kanban = loaded_board(
        Arc::clone(&service),
        vec![
            card("X", ApplicationStatus::Applied, "a0"),
            card("Y", ApplicationStatus::Applied, "a1"),
            card("Z", ApplicationStatus::Applied, "a2"),
        ],
    )
    .await;

    kanban
        .drop_card(&DragGesture::onto_card(
            "Z",
            ApplicationStatus::Applied,
            "Y",
            Edge::Above,
        ))
        .await
        .unwrap();

    assert_eq!(
        column_ids(&kanban, ApplicationStatus::Applied).await,
        vec!["X", "Z", "Y"]
    );
    assert_eq!(service.mutation_count(), 1);

    let z = service.get(&ApplicationId::from("Z")).await.unwrap();
    assert!("a0" < z.position.as_str() && z.position.as_str() < "a1");
    assert_eq!(service.get(&ApplicationId::from("X")).await.unwrap().position, "a0");
    assert_eq!(service.get(&ApplicationId::from("Y")).await.unwrap().position, "a1");
}

#[tokio::test]
async fn test_dropping_last_card_on_own_column_sends_nothing() {
    let service = Arc::new(InMemoryService::new());
    let kanban = loaded_board(
        Arc::clone(&service),
        vec![
            card("X", ApplicationStatus::Applied, "a0"),
            card("Y", ApplicationStatus::Applied, "a1"),
        ],
    )
    .await;

    let outcome = kanban
        .drop_card(&DragGesture::onto_column("Y", ApplicationStatus::Applied))
        .await
        .unwrap();

    assert_eq!(outcome, DropOutcome::Unchanged);
    assert_eq!(service.mutation_count(), 0);
}

#[tokio::test]
async fn test_new_cards_append_to_column() {
    let service = Arc::new(InMemoryService::new());
    let kanban = loaded_board(Arc::clone(&service), Vec::new()).await;

    let mut positions = Vec::new();
    for company in ["Acme", "Globex", "Initech"] {
        let created = kanban
            .add_application(NewApplication::new(company, "Engineer", ApplicationStatus::Screening))
            .await
            .unwrap();
        positions.push(created.position);
    }
    assert_eq!(positions, vec!["a0", "a1", "a2"]);

    // Moving the first card to the end skips past the current last one
    let first = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .find(|app| app.company == "Acme")
        .unwrap();
    let outcome = kanban
        .drop_card(&DragGesture::onto_column(
            first.id.clone(),
            ApplicationStatus::Screening,
        ))
        .await
        .unwrap();

    assert!(matches!(outcome, DropOutcome::Moved(ref app) if app.position == "a3"));
}

#[tokio::test(start_paused = true)]
async fn test_offline_create_shows_placeholder_then_rolls_back() {
    let service = Arc::new(InMemoryService::new().with_latency(Duration::from_millis(100)));
    let kanban = Arc::new(
        loaded_board(
            Arc::clone(&service),
            vec![
                card("A", ApplicationStatus::Applied, "a0"),
                card("B", ApplicationStatus::Applied, "a1"),
            ],
        )
        .await,
    );
    let before = kanban.cache().data().await;
    service.set_offline(true);

    let pending = {
        let kanban = Arc::clone(&kanban);
        tokio::spawn(async move {
            kanban
                .add_application(NewApplication::new(
                    "Globex",
                    "SRE",
                    ApplicationStatus::Applied,
                ))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    let applied = kanban.columns().await.remove(0);
    assert_eq!(applied.applications.len(), 3);
    assert_eq!(applied.applications[2].company, "Globex");
    assert_eq!(applied.applications[2].position, "a2");

    let result = pending.await.unwrap();
    assert!(result.unwrap_err().is_rejected_mutation());
    assert_eq!(kanban.cache().data().await, before);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_moves_converge_after_refetch() {
    let service = Arc::new(InMemoryService::new().with_latency(Duration::from_millis(20)));
    let kanban = Arc::new(
        loaded_board(
            Arc::clone(&service),
            vec![
                card("A", ApplicationStatus::Applied, "a0"),
                card("B", ApplicationStatus::Applied, "a1"),
            ],
        )
        .await,
    );

    let first = {
        let kanban = Arc::clone(&kanban);
        tokio::spawn(async move {
            kanban
                .drop_card(&DragGesture::onto_column("A", ApplicationStatus::Interview))
                .await
        })
    };
    let second = {
        let kanban = Arc::clone(&kanban);
        tokio::spawn(async move {
            kanban
                .drop_card(&DragGesture::onto_column("B", ApplicationStatus::Offer))
                .await
        })
    };

    assert!(matches!(first.await.unwrap().unwrap(), DropOutcome::Moved(_)));
    assert!(matches!(second.await.unwrap().unwrap(), DropOutcome::Moved(_)));

    assert_eq!(kanban.cache().data().await, Some(service.list().await.unwrap()));
    assert_eq!(column_ids(&kanban, ApplicationStatus::Interview).await, vec!["A"]);
    assert_eq!(column_ids(&kanban, ApplicationStatus::Offer).await, vec!["B"]);
    assert!(column_ids(&kanban, ApplicationStatus::Applied).await.is_empty());
}

#[tokio::test]
async fn test_board_from_saved_config() {
    let temp_dir = TempDir::new().unwrap();
    let store = ConfigStore::new(temp_dir.path());
    store.initialize().await.unwrap();

    let config = store.load_board_config().await.unwrap();
    let service = Arc::new(InMemoryService::new());
    let kanban = Kanban::new(service, config).unwrap();

    let names: Vec<String> = kanban
        .columns()
        .await
        .into_iter()
        .map(|view| view.column.name)
        .collect();
    assert_eq!(names.len(), ApplicationStatus::COLUMNS.len());
    assert!(names.iter().all(|name| !name.is_empty()));
}
