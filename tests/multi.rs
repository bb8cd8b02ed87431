use simple_di::{
    BoxError, Cardinality, DependencySpec, Depends, DiagnosticKind, DiagnosticLog, Injected, Provider,
    ServiceCollection,
};
use std::sync::Arc;

trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
}

struct Csv;
impl Plugin for Csv {
    fn name(&self) -> &'static str {
        "csv"
    }
}

struct Json;
impl Plugin for Json {
    fn name(&self) -> &'static str {
        "json"
    }
}

struct Yaml;
impl Plugin for Yaml {
    fn name(&self) -> &'static str {
        "yaml"
    }
}

type DynPlugin = Box<dyn Plugin>;

struct Host {
    plugins: Vec<Option<Arc<DynPlugin>>>,
}

fn plugin<P: Plugin + 'static>(name: &str, make: fn() -> P) -> Provider {
    Provider::new(name, move |_| Box::new(make()) as DynPlugin).with_service_names(["Plugin"])
}

fn host() -> Provider {
    Provider::new("Host", |args| Host {
        plugins: args.multiple::<DynPlugin>(0),
    })
    .with_depends(Depends::List(vec![DependencySpec::multiple("Plugin")]))
}

fn names(host: &Host) -> Vec<Option<&'static str>> {
    host.plugins.iter().map(|p| p.as_ref().map(|p| p.name())).collect()
}

#[test]
fn test_multiple_in_registration_order() {
    let mut sc = ServiceCollection::new();
    sc.add_service(plugin("Csv", || Csv));
    sc.add_service(plugin("Json", || Json));
    sc.add_service(plugin("Yaml", || Yaml));
    sc.add_service(host());

    let sp = sc.build();
    let host = sp.construct_by_name::<Host>("Host").unwrap().unwrap();
    assert_eq!(names(&host), vec![Some("csv"), Some("json"), Some("yaml")]);
}

#[test]
fn test_multiple_keeps_failed_entries_in_place() {
    let log = Arc::new(DiagnosticLog::new());
    let mut sc = ServiceCollection::new();
    sc.add_observer(log.clone());
    sc.add_service(plugin("Csv", || Csv));
    sc.add_service(
        Provider::try_new("Broken", |_| -> Result<DynPlugin, BoxError> { Err("bad config".into()) })
            .with_service_names(["Plugin"]),
    );
    sc.add_service(plugin("Yaml", || Yaml));
    sc.add_service(host());

    let sp = sc.build();
    let host = sp.construct_by_name::<Host>("Host").unwrap().unwrap();
    assert_eq!(names(&host), vec![Some("csv"), None, Some("yaml")]);
    assert_eq!(log.kinds(), vec![DiagnosticKind::ConstructorFailed]);
}

#[test]
fn test_multiple_with_single_provider() {
    let mut sc = ServiceCollection::new();
    sc.add_service(plugin("Json", || Json));
    sc.add_service(host());

    let sp = sc.build();
    let host = sp.construct_by_name::<Host>("Host").unwrap().unwrap();
    assert_eq!(names(&host), vec![Some("json")]);
}

#[test]
fn test_multiple_without_providers_is_null() {
    let log = Arc::new(DiagnosticLog::new());
    let mut sc = ServiceCollection::new();
    sc.add_observer(log.clone());
    sc.add_service(Provider::new("Probe", |args| args.is_null(0)).with_depends(Depends::List(vec![
        DependencySpec::multiple("Plugin"),
    ])));

    let sp = sc.build();
    assert!(*sp.construct_by_name::<bool>("Probe").unwrap().unwrap());
    assert_eq!(log.kinds(), vec![DiagnosticKind::MissingDependency]);
}

#[test]
fn test_ambiguous_single_is_null_but_siblings_resolve() {
    struct Report {
        plugin: bool,
        title: Option<Arc<String>>,
    }

    let log = Arc::new(DiagnosticLog::new());
    let mut sc = ServiceCollection::new();
    sc.add_observer(log.clone());
    sc.add_service(plugin("Csv", || Csv));
    sc.add_service(plugin("Json", || Json));
    sc.add_service(Provider::new("Title", |_| "Quarterly".to_string()));
    sc.add_service(
        Provider::new("Report", |args| Report {
            plugin: args.is_null(0),
            title: args.single::<String>(1),
        })
        .with_depends(Depends::list(["Plugin", "Title"])),
    );

    let sp = sc.build();
    let report = sp.construct_by_name::<Report>("Report").unwrap().unwrap();
    assert!(report.plugin);
    assert_eq!(report.title.as_deref().map(String::as_str), Some("Quarterly"));

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, DiagnosticKind::CardinalityMismatch);
    assert_eq!(
        entries[0].message,
        "Can't construct Report because its dependency Plugin does not have exactly one implementation"
    );
}

#[test]
fn test_missing_single_is_null_but_siblings_resolve() {
    let log = Arc::new(DiagnosticLog::new());
    let mut sc = ServiceCollection::new();
    sc.add_observer(log.clone());
    sc.add_service(Provider::new("Title", |_| "Quarterly".to_string()));
    sc.add_service(
        Provider::new("Report", |args| (args.is_null(0), args.single::<String>(1).is_some()))
            .with_depends(Depends::list(["Chart", "Title"])),
    );

    let sp = sc.build();
    let report = sp.construct_by_name::<(bool, bool)>("Report").unwrap().unwrap();
    assert_eq!(*report, (true, true));
    assert_eq!(log.entries()[0].message, "Can't construct Report because it needs Chart");
}

#[test]
fn test_same_provider_is_shared_between_single_and_multiple() {
    struct Both {
        single: Option<Arc<String>>,
        all: Vec<Option<Arc<String>>>,
    }

    let mut sc = ServiceCollection::new();
    sc.add_service(Provider::new("Greeting", |_| "hello".to_string()));
    sc.add_service(
        Provider::new("Both", |args| Both {
            single: args.single::<String>(0),
            all: args.multiple::<String>(1),
        })
        .with_depends(Depends::List(vec![
            "Greeting".into(),
            ("Greeting", Cardinality::Multiple).into(),
        ])),
    );

    let sp = sc.build();
    let both = sp.construct_by_name::<Both>("Both").unwrap().unwrap();
    let single = both.single.as_ref().unwrap();
    let first = both.all[0].as_ref().unwrap();
    assert!(Arc::ptr_eq(single, first));
}

#[test]
fn test_raw_arguments() {
    let mut sc = ServiceCollection::new();
    sc.add_service(Provider::new("A", |_| 1u8));
    sc.add_service(
        Provider::new("Inspect", |args| {
            let shapes: Vec<&'static str> = (0..args.len())
                .map(|i| match args.get(i) {
                    Some(Injected::Null) => "null",
                    Some(Injected::Single(Some(_))) => "single",
                    Some(Injected::Single(None)) => "failed",
                    Some(Injected::Multiple(_)) => "multiple",
                    None => "absent",
                })
                .collect();
            shapes
        })
        .with_depends(Depends::List(vec![
            "A".into(),
            "Missing".into(),
            DependencySpec::multiple("A"),
        ])),
    );

    let sp = sc.build();
    let shapes = sp.construct_by_name::<Vec<&'static str>>("Inspect").unwrap().unwrap();
    assert_eq!(*shapes, vec!["single", "null", "multiple"]);
}

#[test]
fn test_wrong_type_reads_as_none() {
    let mut sc = ServiceCollection::new();
    sc.add_service(Provider::new("Number", |_| 5u32));
    sc.add_service(
        Provider::new("Reader", |args| args.single::<String>(0).is_none() && args.single::<u32>(0).is_some())
            .with_depends(Depends::list(["Number"])),
    );

    let sp = sc.build();
    assert!(*sp.construct_by_name::<bool>("Reader").unwrap().unwrap());
}
