use simple_di::{DiError, Depends, Provider, ServiceCollection};
use std::sync::{Arc, Mutex};

struct Clock {
    i: String,
}

struct MyClass {
    c: Option<Arc<Clock>>,
}

fn clock() -> Provider {
    Provider::new("Clock", |_| Clock { i: "x".to_string() })
}

fn my_class() -> Provider {
    Provider::new("MyClass", |args| MyClass { c: args.single::<Clock>(0) })
}

#[test]
fn test_registered_services_construct() {
    let mut sc = ServiceCollection::new();
    sc.add_service(clock());
    let my_class = sc.add_service(my_class());
    sc.set_dependencies(my_class, Depends::list(["Clock"])).unwrap();

    let sp = sc.build();
    let obj = sp.construct_by_name::<MyClass>("MyClass").unwrap().unwrap();

    assert_eq!(obj.c.as_ref().unwrap().i, "x");
}

#[test]
fn test_discovered_classes_construct() {
    let mut sc = ServiceCollection::new();
    sc.add_class(clock().with_depends(Depends::Null));
    sc.add_class(my_class().with_depends(Depends::list(["Clock"])));

    let sp = sc.build();
    let obj = sp.construct_by_name::<MyClass>("MyClass").unwrap().unwrap();

    assert_eq!(obj.c.as_ref().unwrap().i, "x");
}

#[test]
fn test_registering_twice_is_harmless() {
    let mut sc = ServiceCollection::new();
    let clock = sc.add_service(clock().with_depends(Depends::Null));
    let my_class = sc.add_service(my_class().with_depends(Depends::list(["Clock"])));

    // A second default registration of the same providers changes nothing
    assert!(sc.register_default(clock));
    assert!(sc.register_default(my_class));
    assert_eq!(sc.lookup("Clock").unwrap().len(), 1);
    assert_eq!(sc.lookup("MyClass").unwrap().len(), 1);

    let sp = sc.build();
    let obj = sp.construct_by_name::<MyClass>("MyClass").unwrap().unwrap();
    assert_eq!(obj.c.as_ref().unwrap().i, "x");
}

#[test]
fn test_instances_are_not_cached_across_calls() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();
    sc.add_service(Provider::new("Counter", move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        *c
    }));

    let sp = sc.build();
    let first = sp.construct_by_name::<i32>("Counter").unwrap().unwrap();
    let second = sp.construct_by_name::<i32>("Counter").unwrap().unwrap();

    assert_eq!(*first, 1);
    assert_eq!(*second, 2);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_construct_by_name_not_found() {
    let sp = ServiceCollection::new().build();
    let err = sp.construct_by_name::<MyClass>("MyClass").err().unwrap();
    assert_eq!(err, DiError::NotFound("MyClass".to_string()));
}

#[test]
fn test_construct_by_name_ambiguous() {
    let mut sc = ServiceCollection::new();
    sc.add_service(Provider::new("First", |_| 1u8).with_service_names(["Number"]));
    sc.add_service(Provider::new("Second", |_| 2u8).with_service_names(["Number"]));

    let sp = sc.build();
    let err = sp.construct_by_name::<u8>("Number").err().unwrap();
    assert_eq!(
        err,
        DiError::Ambiguous {
            name: "Number".to_string(),
            count: 2
        }
    );
}

#[test]
fn test_construct_by_name_type_mismatch() {
    let mut sc = ServiceCollection::new();
    sc.add_service(clock());

    let sp = sc.build();
    match sp.construct_by_name::<String>("Clock") {
        Err(DiError::TypeMismatch { provider, expected }) => {
            assert_eq!(provider, "Clock");
            assert!(expected.contains("String"));
        }
        other => panic!("expected a type mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unbuildable_root_is_none() {
    let mut sc = ServiceCollection::new();
    let loose = sc.add_provider(Provider::new("Loose", |_| 1u8));
    sc.register(loose, &["Loose"]);
    sc.add_service(clock());

    let sp = sc.build();
    assert!(sp.construct_by_name::<u8>("Loose").unwrap().is_none());
    assert!(sp.construct_by_name_any("Loose").unwrap().is_none());
    assert!(sp.construct_by_name_any("Clock").unwrap().is_some());
    assert_eq!(
        sp.construct_by_name_any("Missing").err(),
        Some(DiError::NotFound("Missing".to_string()))
    );
}

#[test]
fn test_construct_object_by_handle() {
    let mut sc = ServiceCollection::new();
    sc.add_service(clock());
    let my_class = sc.add_service(my_class().with_depends(Depends::list(["Clock"])));

    let sp = sc.build();
    let obj = sp.construct_object_as::<MyClass>(my_class).unwrap().unwrap();
    assert_eq!(obj.c.as_ref().unwrap().i, "x");
    assert!(sp.construct_object(my_class).is_some());
}

#[test]
fn test_missing_dependency_leaves_none() {
    let mut sc = ServiceCollection::new();
    sc.add_service(my_class().with_depends(Depends::list(["Clock"])));

    let sp = sc.build();
    let obj = sp.construct_by_name::<MyClass>("MyClass").unwrap().unwrap();
    assert!(obj.c.is_none());
}

#[test]
fn test_provider_is_shared_across_threads() {
    let mut sc = ServiceCollection::new();
    sc.add_service(clock());
    sc.add_service(my_class().with_depends(Depends::list(["Clock"])));
    let sp = sc.build();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sp = sp.clone();
            std::thread::spawn(move || sp.construct_by_name::<MyClass>("MyClass").unwrap().unwrap().c.is_some())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
