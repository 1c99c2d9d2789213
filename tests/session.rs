mod common;

use common::{brillouin_scan, BYTES};
use stokes::attributes::{Bucket, RenderableValue};
use stokes::data::{MemoryContainer, ROOT_PATH};
use stokes::inspect::Inspection;
use stokes::plot::{PlotLimits, PlotStatus, Visualization};
use stokes::preview::PreviewLimits;
use stokes::session::Session;
use stokes::StokesError;

fn opened(container: &MemoryContainer) -> Session {
    let mut session = Session::new();
    session.open(container, "scan.h5", BYTES).unwrap();
    session
}

#[test]
fn test_group_enumerated_once() {
    let container = brillouin_scan();
    let mut session = opened(&container);

    session.expand(ROOT_PATH).unwrap();
    session.expand("/Data").unwrap();
    session.collapse("/Data");
    session.expand("/Data").unwrap();

    assert_eq!(container.list_calls(ROOT_PATH), 1);
    assert_eq!(container.list_calls("/Data"), 1);

    let paths: Vec<String> = session
        .visible_rows()
        .into_iter()
        .map(|row| row.node.path)
        .collect();
    assert_eq!(
        paths,
        ["/", "/Data", "/Data/Raw", "/Data/PSD", "/Data/Frequency", "/Data/Cube"]
    );
}

#[test]
fn test_enumeration_failure_is_local() {
    let container = brillouin_scan();
    let mut session = opened(&container);
    session.expand(ROOT_PATH).unwrap();

    container.fail_listing("/Data");
    assert!(matches!(
        session.expand("/Data"),
        Err(StokesError::Enumeration { .. })
    ));
    let row = session
        .visible_rows()
        .into_iter()
        .find(|row| row.node.path == "/Data")
        .unwrap();
    assert!(row.error.is_some());
    assert!(!row.expanded);

    container.heal_listing("/Data");
    assert_eq!(session.expand("/Data").unwrap().len(), 4);
}

#[test]
fn test_stale_selection_discarded() {
    let container = brillouin_scan();
    let mut session = opened(&container);
    session.expand(ROOT_PATH).unwrap();
    session.expand("/Data").unwrap();

    let first = session.select("/Data/PSD").unwrap();
    let fetched = session
        .fetch(first, |backend, node, tree| {
            Inspection::gather(backend, node, tree, &PreviewLimits::default())
        })
        .unwrap();

    let second = session.select("/Data/Frequency").unwrap();
    assert!(session.accept(fetched).is_none());
    assert!(session.fetch(first, |_, _, _| ()).is_none());

    let reads = container.reads().len();
    let fetched = session
        .fetch(second, |backend, node, tree| {
            Inspection::gather(backend, node, tree, &PreviewLimits::default())
        })
        .unwrap();
    let inspection = session.accept(fetched).unwrap();
    assert_eq!(inspection.node.path, "/Data/Frequency");
    assert_eq!(container.reads().len(), reads + 1);
}

#[test]
fn test_reopen_invalidates_tickets() {
    let container = brillouin_scan();
    let mut session = opened(&container);
    let ticket = session.select(ROOT_PATH).unwrap();
    let epoch = session.epoch();

    let other = MemoryContainer::new("other.h5");
    session.open(&other, "other.h5", BYTES).unwrap();

    assert!(container.is_closed());
    assert!(session.epoch() > epoch);
    assert!(!session.is_current(ticket));
    assert_eq!(session.file_name(), Some("other.h5"));
    assert_eq!(session.selection(), None);
}

#[test]
fn test_failed_open_resets_session() {
    let container = brillouin_scan();
    let mut session = opened(&container);
    session.expand(ROOT_PATH).unwrap();

    assert!(matches!(
        session.open(&container, "empty.h5", &[]),
        Err(StokesError::Open { .. })
    ));
    assert!(!session.is_open());
    assert!(session.visible_rows().is_empty());
    assert!(matches!(
        session.expand(ROOT_PATH),
        Err(StokesError::NoContainer)
    ));
}

#[test]
fn test_inspection_classifies_attributes() {
    let container = brillouin_scan();
    let mut session = opened(&container);
    session.expand(ROOT_PATH).unwrap();
    session.expand("/Data").unwrap();
    let ticket = session.select("/Data/PSD").unwrap();

    let fetched = session
        .fetch(ticket, |backend, node, tree| {
            Inspection::gather(backend, node, tree, &PreviewLimits::default())
        })
        .unwrap();
    let inspection = session.accept(fetched).unwrap();
    let classified = inspection.attributes.as_ref().unwrap();

    assert_eq!(classified.brillouin_type(), Some("PSD"));
    assert_eq!(classified.bucket(Bucket::Measure)[0].label, "Date");
    assert_eq!(classified.bucket(Bucket::Spectrometer)[0].label, "Type");

    let other = classified.bucket(Bucket::Other);
    assert_eq!(other.len(), 2);
    match &other[0].display {
        RenderableValue::Structured(tree) => {
            assert_eq!(tree.root().label.as_deref(), Some("Lorentzian"));
        },
        value => panic!("expected a structured tree, got {:?}", value),
    }
    assert_eq!(other[1].display, RenderableValue::Invalid("not-json".to_string()));
}

#[test]
fn test_visualization_from_session() {
    let container = brillouin_scan();
    let mut session = opened(&container);
    session.expand(ROOT_PATH).unwrap();
    session.expand("/Data").unwrap();

    let ticket = session.select("/Data/Cube").unwrap();
    let vis = session
        .fetch(ticket, |backend, node, _| {
            let meta = node.dataset().unwrap();
            Visualization::load(
                backend,
                &node.path,
                &node.name,
                meta,
                &PlotLimits::default(),
                Default::default(),
            )
        })
        .and_then(|fetched| session.accept(fetched))
        .unwrap();
    assert_eq!(vis.request(), PlotStatus::Unsupported { rank: 3 });
}
