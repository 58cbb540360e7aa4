use std::collections::HashSet;

use super::entity::QualifiedName;

/// Classes, interfaces and traits shipped with PHP and its bundled
/// extensions.
const PHP_INTERNALS: &[&str] = &[
    // Core
    "stdClass", "Closure", "Generator", "WeakReference", "WeakMap", "Fiber", "Attribute",
    "ReturnTypeWillChange", "AllowDynamicProperties", "SensitiveParameter",
    "SensitiveParameterValue", "Override", "UnitEnum", "BackedEnum", "Stringable",
    "Traversable", "Iterator", "IteratorAggregate", "ArrayAccess", "Countable",
    "Serializable", "JsonSerializable", "InternalIterator", "__PHP_Incomplete_Class",
    // Errors and exceptions
    "Throwable", "Exception", "Error", "ErrorException", "TypeError", "ValueError",
    "ArithmeticError", "DivisionByZeroError", "ArgumentCountError", "AssertionError",
    "CompileError", "ParseError", "UnhandledMatchError", "FiberError", "JsonException",
    "LogicException", "BadFunctionCallException", "BadMethodCallException",
    "DomainException", "InvalidArgumentException", "LengthException",
    "OutOfRangeException", "RuntimeException", "OutOfBoundsException",
    "OverflowException", "RangeException", "UnderflowException",
    "UnexpectedValueException",
    // SPL
    "SplFileInfo", "SplFileObject", "SplTempFileObject", "DirectoryIterator",
    "FilesystemIterator", "RecursiveDirectoryIterator", "GlobIterator",
    "SplDoublyLinkedList", "SplQueue", "SplStack", "SplHeap", "SplMinHeap", "SplMaxHeap",
    "SplPriorityQueue", "SplFixedArray", "SplObjectStorage", "SplObserver", "SplSubject",
    "ArrayObject", "ArrayIterator", "RecursiveArrayIterator", "AppendIterator",
    "CachingIterator", "RecursiveCachingIterator", "CallbackFilterIterator",
    "RecursiveCallbackFilterIterator", "EmptyIterator", "FilterIterator",
    "RecursiveFilterIterator", "ParentIterator", "InfiniteIterator", "IteratorIterator",
    "LimitIterator", "MultipleIterator", "NoRewindIterator", "OuterIterator",
    "RecursiveIterator", "RecursiveIteratorIterator", "RecursiveTreeIterator",
    "RegexIterator", "RecursiveRegexIterator", "SeekableIterator",
    // Date
    "DateTime", "DateTimeImmutable", "DateTimeInterface", "DateTimeZone", "DateInterval",
    "DatePeriod",
    // Reflection
    "Reflection", "Reflector", "ReflectionException", "ReflectionClass",
    "ReflectionObject", "ReflectionMethod", "ReflectionFunction",
    "ReflectionFunctionAbstract", "ReflectionParameter", "ReflectionProperty",
    "ReflectionType", "ReflectionNamedType", "ReflectionUnionType",
    "ReflectionIntersectionType", "ReflectionClassConstant", "ReflectionExtension",
    "ReflectionGenerator", "ReflectionAttribute", "ReflectionEnum",
    "ReflectionEnumUnitCase", "ReflectionEnumBackedCase", "ReflectionFiber",
    "ReflectionReference", "ReflectionZendExtension",
    // Bundled extensions
    "PDO", "PDOStatement", "PDOException", "PDORow", "DOMDocument", "DOMElement",
    "DOMNode", "DOMNodeList", "DOMXPath", "DOMAttr", "DOMText", "DOMException",
    "SimpleXMLElement", "SimpleXMLIterator", "XMLReader", "XMLWriter", "Phar",
    "PharData", "PharFileInfo", "PharException", "ZipArchive", "CURLFile",
    "CurlHandle", "IntlDateFormatter", "NumberFormatter", "Collator", "Locale",
    "Normalizer", "MessageFormatter", "mysqli", "mysqli_result", "mysqli_stmt",
    "mysqli_sql_exception", "SQLite3", "SQLite3Stmt", "SQLite3Result", "SessionHandler",
    "SessionHandlerInterface", "SessionIdInterface", "Random\\Randomizer",
];

/// Fixed table of platform entities. Lookups are case-insensitive, as
/// class names are in PHP.
#[derive(Debug, Clone)]
pub struct InternalTable {
    names: HashSet<String>,
}

impl InternalTable {
    pub fn php() -> Self {
        Self::from_names(PHP_INTERNALS.iter().copied())
    }

    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| QualifiedName::parse(name.as_ref()).to_string().to_lowercase())
                .collect(),
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.names.extend(Self::from_names(names).names);
        self
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.names.contains(&name.to_string().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for InternalTable {
    fn default() -> Self {
        Self::php()
    }
}
