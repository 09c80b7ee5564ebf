//! String sub-kind generators.
//!
//! A `string` parameter whose annotation ends in a bracketed tag, such as
//! `@param string $to [email]`, is produced by the generator registered under
//! that tag. Tags match case-insensitively.

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::GeneratorConfig;
use crate::error::FactoryError;
use crate::generator::{Generator, OneOfGenerator};

const LOREM: &[&str] = &[
    "a", "ab", "accusamus", "ad", "adipisci", "alias", "aliquam", "amet", "animi", "aperiam",
    "architecto", "at", "atque", "aut", "autem", "beatae", "blanditiis", "commodi", "consectetur",
    "corporis", "corrupti", "culpa", "cum", "cumque", "cupiditate", "debitis", "delectus",
    "deleniti", "dicta", "dignissimos", "distinctio", "dolor", "dolore", "dolorem", "doloremque",
    "dolores", "ducimus", "ea", "eaque", "earum", "eius", "eligendi", "enim", "eos", "error",
    "esse", "est", "et", "eum", "eveniet", "ex", "excepturi", "exercitationem", "expedita",
    "explicabo", "facere", "facilis", "fuga", "fugiat", "fugit", "harum", "hic", "id", "illo",
    "impedit", "in", "incidunt", "ipsa", "ipsam", "ipsum", "iste", "itaque", "iure", "iusto",
    "labore", "laboriosam", "laudantium", "libero", "magnam", "magni", "maiores", "maxime",
    "minima", "minus", "modi", "molestiae", "mollitia", "nam", "natus", "necessitatibus", "nemo",
    "neque", "nesciunt", "nihil", "nisi", "nobis", "non", "nostrum", "nulla", "numquam", "odio",
    "odit", "officia", "omnis", "optio", "perferendis", "perspiciatis", "placeat", "porro",
    "possimus", "praesentium", "provident", "quae", "quaerat", "quam", "quas", "quasi", "qui",
    "quia", "quibusdam", "quidem", "quis", "quisquam", "quo", "quod", "quos", "ratione",
    "recusandae", "reiciendis", "rem", "repellat", "repellendus", "reprehenderit", "repudiandae",
    "rerum", "saepe", "sapiente", "sed", "sequi", "similique", "sint", "sit", "soluta", "sunt",
    "suscipit", "tempora", "tempore", "temporibus", "tenetur", "totam", "ullam", "unde", "ut",
    "vel", "velit", "veniam", "veritatis", "vero", "vitae", "voluptas", "voluptate",
    "voluptatem", "voluptates", "voluptatibus", "voluptatum",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Alice", "Amara", "Bjorn", "Carla", "Chen", "Dmitri", "Elena", "Emeka",
    "Fatima", "Grace", "Hana", "Ines", "Ivan", "Jamal", "Joanna", "Kenji", "Lars", "Leila",
    "Linus", "Maria", "Mateo", "Nadia", "Noah", "Olga", "Omar", "Priya", "Rosa", "Sofia",
    "Tariq", "Thomas", "Ursula", "Victor", "Wen", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Adeyemi", "Berg", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Hopper",
    "Ibrahim", "Jensen", "Kowalski", "Lovelace", "Martin", "Nakamura", "Novak", "Okafor",
    "Petrov", "Quinn", "Rossi", "Schmidt", "Silva", "Tanaka", "Turing", "Ueda", "Varga",
    "Walsh", "Xu", "Yilmaz", "Zhang",
];

const TLDS: &[&str] = &["com", "org", "net", "io", "dev", "info", "biz"];

const SAFE_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

fn lorem_word(rng: &mut dyn rand::RngCore) -> &'static str {
    LOREM.choose(rng).copied().unwrap_or("lorem")
}

fn alphanumeric(rng: &mut dyn rand::RngCore, min_len: usize, max_len: usize) -> String {
    let valid_chars = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let len = rng.r#gen_range(min_len..=max_len);
    (0..len)
        .map(|_| valid_chars[rng.r#gen_range(0..valid_chars.len())] as char)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn domain_name(rng: &mut dyn rand::RngCore) -> String {
    let name = if rng.r#gen::<bool>() {
        lorem_word(rng).to_string()
    } else {
        alphanumeric(rng, 3, 12)
    };
    let tld = TLDS.choose(rng).copied().unwrap_or("com");
    format!("{}.{}", name, tld)
}

/// Lorem ipsum text of 5 up to `max_text_len` characters, ending in a period
#[derive(Debug, Clone, Default)]
pub struct TextGenerator;

impl Generator<String> for TextGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
        let target = rng.r#gen_range(5..=config.max_text_len.max(5));
        let body_len = target - 1;
        let mut text = String::with_capacity(target);

        while text.len() < body_len {
            let remaining = body_len - text.len();
            let word = lorem_word(rng);
            if text.is_empty() {
                text.push_str(&word[..word.len().min(remaining)]);
            } else if remaining == 1 {
                text.push((b'a' + rng.r#gen_range(0..26)) as char);
            } else {
                text.push(' ');
                text.push_str(&word[..word.len().min(remaining - 1)]);
            }
        }

        let mut text = capitalize(&text);
        text.push('.');
        text
    }
}

/// Lorem ipsum sentence with a capitalized first word
#[derive(Debug, Clone)]
pub struct SentenceGenerator {
    min_words: usize,
    max_words: usize,
}

impl SentenceGenerator {
    /// Create a new sentence generator
    pub fn new(min_words: usize, max_words: usize) -> Self {
        Self {
            min_words,
            max_words,
        }
    }
}

impl Default for SentenceGenerator {
    fn default() -> Self {
        Self::new(3, 10)
    }
}

impl Generator<String> for SentenceGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        let num_words = rng.r#gen_range(self.min_words.max(1)..=self.max_words.max(1));
        let words: Vec<&str> = (0..num_words).map(|_| lorem_word(rng)).collect();

        let mut sentence = capitalize(&words.join(" "));
        sentence.push('.');
        sentence
    }
}

/// Human names in the forms `First Last`, `First` or `Last`
#[derive(Debug, Clone)]
pub enum NameGenerator {
    Full,
    First,
    Last,
}

impl Generator<String> for NameGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
        match self {
            NameGenerator::First => OneOfGenerator::new(FIRST_NAMES).generate(rng, config),
            NameGenerator::Last => OneOfGenerator::new(LAST_NAMES).generate(rng, config),
            NameGenerator::Full => format!(
                "{} {}",
                NameGenerator::First.generate(rng, config),
                NameGenerator::Last.generate(rng, config)
            ),
        }
    }
}

/// Lowercase user names such as `grace`, `grace42` or `grace.hopper`
#[derive(Debug, Clone, Default)]
pub struct UserNameGenerator;

impl Generator<String> for UserNameGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
        let first = NameGenerator::First.generate(rng, config).to_lowercase();
        match rng.r#gen_range(0..3) {
            0 => first,
            1 => format!("{}{}", first, rng.r#gen_range(1..1000)),
            _ => format!(
                "{}.{}",
                first,
                NameGenerator::Last.generate(rng, config).to_lowercase()
            ),
        }
    }
}

/// Generator for email addresses
#[derive(Debug, Clone)]
pub struct EmailGenerator {
    safe: bool,
}

impl EmailGenerator {
    /// Addresses on arbitrary generated domains
    pub fn new() -> Self {
        Self { safe: false }
    }

    /// Addresses on the reserved `example.*` domains only
    pub fn safe() -> Self {
        Self { safe: true }
    }

    fn generate_local_part(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
        if rng.r#gen::<bool>() {
            return UserNameGenerator.generate(rng, config);
        }

        let segments = rng.r#gen_range(1..=3);
        (0..segments)
            .map(|_| alphanumeric(rng, 1, 8))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Default for EmailGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<String> for EmailGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> String {
        let local = self.generate_local_part(rng, config);
        let domain = if self.safe {
            SAFE_DOMAINS
                .choose(rng)
                .copied()
                .unwrap_or("example.com")
                .to_string()
        } else {
            domain_name(rng)
        };
        format!("{}@{}", local, domain)
    }
}

/// Generator for domain names such as `quia.org`
#[derive(Debug, Clone, Default)]
pub struct DomainNameGenerator;

impl Generator<String> for DomainNameGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        domain_name(rng)
    }
}

/// Generator for http and https URLs
#[derive(Debug, Clone)]
pub struct UrlGenerator {
    include_path: bool,
    include_query: bool,
}

impl UrlGenerator {
    pub fn new() -> Self {
        Self {
            include_path: true,
            include_query: true,
        }
    }

    /// Set whether to include paths
    pub fn with_path(mut self, include: bool) -> Self {
        self.include_path = include;
        self
    }

    /// Set whether to include query parameters
    pub fn with_query(mut self, include: bool) -> Self {
        self.include_query = include;
        self
    }

    fn generate_path(&self, rng: &mut dyn rand::RngCore) -> String {
        let num_segments = rng.r#gen_range(1..=4);
        let segments: Vec<&str> = (0..num_segments).map(|_| lorem_word(rng)).collect();
        format!("/{}", segments.join("/"))
    }

    fn generate_query(&self, rng: &mut dyn rand::RngCore) -> String {
        let num_params = rng.r#gen_range(1..=3);
        let params: Vec<String> = (0..num_params)
            .map(|_| format!("{}={}", lorem_word(rng), alphanumeric(rng, 1, 8)))
            .collect();
        format!("?{}", params.join("&"))
    }
}

impl Default for UrlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<String> for UrlGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        let scheme = if rng.r#gen::<bool>() { "https" } else { "http" };
        let mut url = format!("{}://{}", scheme, domain_name(rng));

        if self.include_path && rng.r#gen::<bool>() {
            url.push_str(&self.generate_path(rng));
        } else {
            url.push('/');
        }

        if self.include_query && rng.r#gen::<bool>() {
            url.push_str(&self.generate_query(rng));
        }

        url
    }
}

/// Generator for IP addresses
#[derive(Debug, Clone)]
pub enum IpAddressGenerator {
    V4,
    V6,
}

impl Generator<String> for IpAddressGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        match self {
            IpAddressGenerator::V4 => Ipv4Addr::from(rng.r#gen::<[u8; 4]>()).to_string(),
            IpAddressGenerator::V6 => Ipv6Addr::from(rng.r#gen::<[u16; 8]>()).to_string(),
        }
    }
}

/// Random (version 4) UUIDs in hyphenated lowercase form
#[derive(Debug, Clone, Default)]
pub struct UuidGenerator;

impl Generator<String> for UuidGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        let mut bytes: [u8; 16] = rng.r#gen();
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

/// A single lorem ipsum word
#[derive(Debug, Clone, Default)]
pub struct WordGenerator;

impl Generator<String> for WordGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        lorem_word(rng).to_string()
    }
}

type BoxedStringGenerator = Box<dyn Generator<String> + Send + Sync>;

/// Registry of string sub-kind generators keyed by lowercase tag
pub struct SubKindRegistry {
    generators: HashMap<String, BoxedStringGenerator>,
}

impl SubKindRegistry {
    /// Create a registry holding the built-in sub-kinds
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("name", NameGenerator::Full);
        registry.register("firstName", NameGenerator::First);
        registry.register("lastName", NameGenerator::Last);
        registry.register("userName", UserNameGenerator);
        registry.register("email", EmailGenerator::new());
        registry.register("safeEmail", EmailGenerator::safe());
        registry.register("domainName", DomainNameGenerator);
        registry.register("url", UrlGenerator::new());
        registry.register("ipv4", IpAddressGenerator::V4);
        registry.register("ipv6", IpAddressGenerator::V6);
        registry.register("uuid", UuidGenerator);
        registry.register("word", WordGenerator);
        registry.register("sentence", SentenceGenerator::default());
        registry.register("text", TextGenerator);
        registry
    }

    /// Create a registry without any sub-kinds
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Register a generator, replacing any previous one for the same tag
    pub fn register<G>(&mut self, tag: &str, generator: G)
    where
        G: Generator<String> + Send + Sync + 'static,
    {
        self.generators
            .insert(tag.to_ascii_lowercase(), Box::new(generator));
    }

    /// Look up the generator for a tag
    pub fn get(&self, tag: &str) -> Result<&(dyn Generator<String> + Send + Sync), FactoryError> {
        self.generators
            .get(&tag.to_ascii_lowercase())
            .map(|generator| &**generator)
            .ok_or_else(|| FactoryError::unknown_sub_kind(tag))
    }

    /// Generate a string for a tag
    pub fn generate(
        &self,
        tag: &str,
        rng: &mut dyn rand::RngCore,
        config: &GeneratorConfig,
    ) -> Result<String, FactoryError> {
        Ok(self.get(tag)?.generate(rng, config))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.generators.contains_key(&tag.to_ascii_lowercase())
    }

    /// Registered tags in lowercase, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl Default for SubKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubKindRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubKindRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn test_text_generator_length() {
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..50 {
            let text = TextGenerator.generate(&mut rng, &config);
            assert!(text.len() >= 5, "too short: {:?}", text);
            assert!(text.len() <= 200, "too long: {:?}", text);
            assert!(text.ends_with('.'));
            assert!(!text.contains("  "));
            assert!(!text.contains(" ."));
        }
    }

    #[test]
    fn test_text_generator_respects_small_limit() {
        let mut rng = thread_rng();
        let config = GeneratorConfig {
            max_text_len: 5,
            ..GeneratorConfig::default()
        };

        for _ in 0..10 {
            assert_eq!(TextGenerator.generate(&mut rng, &config).len(), 5);
        }
    }

    #[test]
    fn test_sentence_generator() {
        let generator = SentenceGenerator::new(3, 5);
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..10 {
            let sentence = generator.generate(&mut rng, &config);
            assert!(sentence.ends_with('.'));
            let words = sentence.trim_end_matches('.').split(' ').count();
            assert!((3..=5).contains(&words));
            assert!(sentence.chars().next().unwrap().is_uppercase());
        }
    }

    #[test]
    fn test_name_generator() {
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..10 {
            let name = NameGenerator::Full.generate(&mut rng, &config);
            let parts: Vec<&str> = name.split(' ').collect();
            assert_eq!(parts.len(), 2);
            assert!(FIRST_NAMES.contains(&parts[0]));
            assert!(LAST_NAMES.contains(&parts[1]));
        }
    }

    #[test]
    fn test_email_generator() {
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..50 {
            let email = EmailGenerator::new().generate(&mut rng, &config);
            assert_eq!(email.matches('@').count(), 1);

            let (local, domain) = email.split_once('@').unwrap();
            assert!(!local.is_empty());
            assert!(!local.starts_with('.') && !local.ends_with('.'));
            assert!(!local.contains(".."));
            assert!(domain.contains('.'));
        }
    }

    #[test]
    fn test_safe_email_domain() {
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..10 {
            let email = EmailGenerator::safe().generate(&mut rng, &config);
            let domain = email.split_once('@').unwrap().1;
            assert!(SAFE_DOMAINS.contains(&domain));
        }
    }

    #[test]
    fn test_url_generator() {
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..10 {
            let url = UrlGenerator::new().generate(&mut rng, &config);
            assert!(url.starts_with("http://") || url.starts_with("https://"));
        }
    }

    #[test]
    fn test_ip_address_generators() {
        let mut rng = thread_rng();
        let config = GeneratorConfig::default();

        for _ in 0..10 {
            let v4 = IpAddressGenerator::V4.generate(&mut rng, &config);
            assert!(v4.parse::<Ipv4Addr>().is_ok());
            let v6 = IpAddressGenerator::V6.generate(&mut rng, &config);
            assert!(v6.parse::<Ipv6Addr>().is_ok());
        }
    }

    #[test]
    fn test_uuid_generator() {
        let mut rng = thread_rng();
        let uuid = UuidGenerator.generate(&mut rng, &GeneratorConfig::default());

        assert_eq!(uuid.len(), 36);
        let groups: Vec<&str> = uuid.split('-').collect();
        assert_eq!(
            groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(groups[2].starts_with('4'));
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = SubKindRegistry::new();
        assert!(registry.contains("email"));
        assert!(registry.contains("EMAIL"));
        assert!(registry.contains("firstname"));
        assert!(registry.get("safeEmail").is_ok());
    }

    #[test]
    fn test_registry_unknown_tag() {
        let registry = SubKindRegistry::new();
        let mut rng = thread_rng();
        let result = registry.generate("emial", &mut rng, &GeneratorConfig::default());
        assert_eq!(result, Err(FactoryError::unknown_sub_kind("emial")));
    }

    #[test]
    fn test_registry_custom_generator() {
        let mut registry = SubKindRegistry::empty();
        assert!(registry.is_empty());

        registry.register(
            "zip",
            crate::generator::from_fn(|rng, _config| format!("{:05}", rng.r#gen_range(0..100_000))),
        );
        assert_eq!(registry.tags(), vec!["zip"]);

        let mut rng = thread_rng();
        let zip = registry
            .generate("Zip", &mut rng, &GeneratorConfig::default())
            .unwrap();
        assert_eq!(zip.len(), 5);
        assert!(zip.bytes().all(|b| b.is_ascii_digit()));
    }
}
