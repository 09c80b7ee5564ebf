//! Integration tests for `#[derive(Factory)]` and `#[factory_suite]`

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use factory::{
    Argument, ClassRegistry, Factory, MethodDeclaration, Runner, RunnerConfig, SuiteBuilder,
    TestError, TestId, TestSuite, factory_suite,
};

/// A registered account
///
/// @param string $name [name]
/// @param int $age
#[derive(Debug, Clone, Factory)]
struct User {
    name: String,
    age: i64,
    /// @var string [email]
    pub email: String,
    /// @var ?string [url]
    pub homepage: Option<String>,
}

/// @param ?Team $parent
#[derive(Debug, Factory)]
struct Team {
    parent: Option<Box<Team>>,
    lead: User,
    /// @var User[2]
    pub members: Vec<User>,
}

fn runner() -> Runner {
    Runner::with_config(RunnerConfig::default().seed(2024)).unwrap()
}

#[test]
fn test_derive_registers_class_graph() {
    let mut classes = ClassRegistry::new();
    Team::register_classes(&mut classes);

    assert!(classes.contains("Team"));
    assert!(classes.contains("User"));

    let user = classes.get("User").unwrap();
    let params: Vec<&str> = user
        .constructor()
        .params
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(params, vec!["name", "age"]);

    let properties: Vec<&str> = user.properties().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(properties, vec!["email", "homepage"]);
    assert!(user.constructor().doc.contains("@param string $name [name]"));
}

#[test]
fn test_derived_arguments_in_closure_suite() {
    let suite = SuiteBuilder::new("Users")
        .register::<User>()
        .method(
            MethodDeclaration::new("test_user")
                .doc("@iterations 25")
                .param_declaration(factory::ParamDeclaration::new(
                    "user",
                    User::declared_type(),
                )),
            |mut args: factory::Arguments| -> Result<(), TestError> {
                let user: User = args.arg("user")?;
                if !user.email.contains('@') {
                    return Err(TestError::assertion(format!("bad email {}", user.email)));
                }
                if let Some(homepage) = &user.homepage
                    && url::Url::parse(homepage).is_err()
                {
                    return Err(TestError::assertion(format!("bad url {}", homepage)));
                }
                if user.name.trim().is_empty() {
                    return Err(TestError::assertion("empty name"));
                }
                Ok(())
            },
        )
        .build();

    let report = runner().run_report(&suite);
    assert!(report.was_successful(), "{}", report);
}

static TEAMS: AtomicUsize = AtomicUsize::new(0);

struct AccountTests;

#[factory_suite]
impl AccountTests {
    /// @iterations 5
    fn test_users_have_addresses(&self, user: User) -> bool {
        user.email.contains('@')
    }

    /// @param string[3] $tags
    /// @iterations 10
    fn test_tags(&self, tags: Vec<String>, _count: i64) -> Result<(), TestError> {
        if tags.len() == 3 && tags.iter().all(|tag| !tag.is_empty()) {
            Ok(())
        } else {
            Err(TestError::assertion(format!("{} tags", tags.len())))
        }
    }

    /// @iterations 3
    fn test_teams(&self, team: Team) {
        assert_eq!(team.members.len(), 2);
        TEAMS.fetch_add(1, Ordering::SeqCst);
    }

    /// @iterations 4
    fn test_always_false(&self, _flag: bool) -> bool {
        false
    }

    fn helper(&self) -> usize {
        7
    }
}

#[test]
fn test_attribute_suite_declarations() {
    let suite = AccountTests;
    assert_eq!(suite.name(), "AccountTests");
    assert_eq!(suite.helper(), 7);

    let names: Vec<String> = suite.methods().into_iter().map(|m| m.name).collect();
    assert_eq!(
        names,
        vec![
            "test_users_have_addresses",
            "test_tags",
            "test_teams",
            "test_always_false"
        ]
    );

    let tags = &suite.methods()[1];
    assert_eq!(tags.params.len(), 2);
    assert!(tags.doc.contains("@param string[3] $tags"));
}

#[test]
fn test_attribute_suite_runs() {
    let mut runner = runner();
    assert_eq!(runner.count(&AccountTests), 22);

    let report = runner.run_report(&AccountTests);
    let unit = |method: &str| report.unit(&TestId::new("AccountTests", method)).unwrap();

    assert!(unit("test_users_have_addresses").is_passed());
    assert!(unit("test_teams").is_passed(), "{}", report);
    assert!(unit("test_tags").is_passed(), "{}", report);
    assert_eq!(unit("test_always_false").failures.len(), 4);
    assert_eq!(TEAMS.load(Ordering::SeqCst), 3);
}

#[test]
fn test_narrow_integer_parameters_stay_in_range() {
    struct Widths;

    #[factory_suite]
    impl Widths {
        fn test_i32(&self, _a: i32) -> bool {
            true
        }

        fn test_u8(&self, _b: u8) -> bool {
            true
        }

        fn test_u64(&self, _c: u64) -> bool {
            true
        }
    }

    let mut report = factory::TestReport::new();
    let summary = runner().run(&Widths, &mut report);
    assert_eq!(summary.tests, 3);
    assert_eq!(summary.iterations, 300);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.errors, 0, "{}", report);
    for method in ["test_i32", "test_u8", "test_u64"] {
        let unit = report.unit(&TestId::new("Widths", method)).unwrap();
        assert!(unit.is_passed(), "{}", report);
    }
}

#[test]
fn test_attribute_suite_rejects_unknown_method() {
    let error = AccountTests.invoke("test_missing", Vec::new()).unwrap_err();
    assert!(!error.is_assertion());
    assert!(error.message().contains("test_missing"));
}
