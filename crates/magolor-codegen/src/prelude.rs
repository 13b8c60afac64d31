//! The emitted standard prelude.
//!
//! Every generated program starts with a `namespace Std` exposing the
//! builtin function catalog: the IO/Parse/Option core, any stdlib modules
//! the program's `using` set pulls in, top-level convenience aliases, and
//! the generic stringification helper interpolation lowers onto. Module
//! names are validated against the catalog so the descriptor stays the
//! single source of truth.

use rustc_hash::FxHashSet;

const BASE_INCLUDES: &[&str] = &[
    "<iostream>",
    "<string>",
    "<functional>",
    "<optional>",
    "<vector>",
    "<sstream>",
    "<fstream>",
    "<stdexcept>",
];

struct PreludeModule {
    name: &'static str,
    includes: &'static [&'static str],
    source: &'static str,
}

/// C++ bodies for the on-demand stdlib modules. The IO/Parse/Option core is
/// always emitted; these join it when the program imports them.
const MODULES: &[PreludeModule] = &[
    PreludeModule {
        name: "Math",
        includes: &["<cmath>", "<algorithm>"],
        source: r#"    namespace Math {
        constexpr double PI = 3.14159265358979323846;
        constexpr double E = 2.71828182845904523536;
        inline double abs(double x) { return std::fabs(x); }
        inline double pow(double base, double exp) { return std::pow(base, exp); }
        inline double sqrt(double x) { return std::sqrt(x); }
        inline double cbrt(double x) { return std::cbrt(x); }
        inline double sin(double x) { return std::sin(x); }
        inline double cos(double x) { return std::cos(x); }
        inline double tan(double x) { return std::tan(x); }
        inline double asin(double x) { return std::asin(x); }
        inline double acos(double x) { return std::acos(x); }
        inline double atan(double x) { return std::atan(x); }
        inline double atan2(double y, double x) { return std::atan2(y, x); }
        inline double exp(double x) { return std::exp(x); }
        inline double log(double x) { return std::log(x); }
        inline double log10(double x) { return std::log10(x); }
        inline double log2(double x) { return std::log2(x); }
        inline double floor(double x) { return std::floor(x); }
        inline double ceil(double x) { return std::ceil(x); }
        inline double round(double x) { return std::round(x); }
        inline double min(double a, double b) { return std::min(a, b); }
        inline double max(double a, double b) { return std::max(a, b); }
        inline double clamp(double val, double low, double high) {
            return std::max(low, std::min(val, high));
        }
    }
"#,
    },
    PreludeModule {
        name: "String",
        includes: &["<algorithm>", "<cctype>"],
        source: r#"    namespace String {
        inline int length(const std::string& s) { return (int)s.length(); }
        inline bool isEmpty(const std::string& s) { return s.empty(); }
        inline std::string trim(const std::string& s) {
            size_t start = s.find_first_not_of(" \t\n\r");
            if (start == std::string::npos) return "";
            size_t end = s.find_last_not_of(" \t\n\r");
            return s.substr(start, end - start + 1);
        }
        inline std::string toLower(const std::string& s) {
            std::string result = s;
            std::transform(result.begin(), result.end(), result.begin(), ::tolower);
            return result;
        }
        inline std::string toUpper(const std::string& s) {
            std::string result = s;
            std::transform(result.begin(), result.end(), result.begin(), ::toupper);
            return result;
        }
        inline bool startsWith(const std::string& s, const std::string& prefix) {
            return s.size() >= prefix.size() && s.compare(0, prefix.size(), prefix) == 0;
        }
        inline bool endsWith(const std::string& s, const std::string& suffix) {
            return s.size() >= suffix.size() &&
                   s.compare(s.size() - suffix.size(), suffix.size(), suffix) == 0;
        }
        inline bool contains(const std::string& s, const std::string& substr) {
            return s.find(substr) != std::string::npos;
        }
        inline std::string replace(const std::string& s, const std::string& from,
                                   const std::string& to) {
            std::string result = s;
            size_t pos = 0;
            while ((pos = result.find(from, pos)) != std::string::npos) {
                result.replace(pos, from.length(), to);
                pos += to.length();
            }
            return result;
        }
        inline std::vector<std::string> split(const std::string& s, const std::string& delim) {
            std::vector<std::string> parts;
            size_t start = 0, pos;
            while ((pos = s.find(delim, start)) != std::string::npos) {
                parts.push_back(s.substr(start, pos - start));
                start = pos + delim.length();
            }
            parts.push_back(s.substr(start));
            return parts;
        }
        inline std::string join(const std::vector<std::string>& parts, const std::string& sep) {
            std::string result;
            for (size_t i = 0; i < parts.size(); i++) {
                if (i > 0) result += sep;
                result += parts[i];
            }
            return result;
        }
        inline std::string repeat(const std::string& s, int count) {
            std::string result;
            for (int i = 0; i < count; i++) result += s;
            return result;
        }
        inline std::string substring(const std::string& s, int start, int length) {
            return s.substr(start, length);
        }
    }
"#,
    },
    PreludeModule {
        name: "Array",
        includes: &["<algorithm>"],
        source: r#"    namespace Array {
        template<typename T> int length(const std::vector<T>& v) { return (int)v.size(); }
        template<typename T> bool isEmpty(const std::vector<T>& v) { return v.empty(); }
        template<typename T> void push(std::vector<T>& v, const T& x) { v.push_back(x); }
        template<typename T> std::optional<T> pop(std::vector<T>& v) {
            if (v.empty()) return std::nullopt;
            T x = v.back();
            v.pop_back();
            return x;
        }
        template<typename T> bool contains(const std::vector<T>& v, const T& x) {
            return std::find(v.begin(), v.end(), x) != v.end();
        }
        template<typename T> void reverse(std::vector<T>& v) { std::reverse(v.begin(), v.end()); }
        template<typename T> void sort(std::vector<T>& v) { std::sort(v.begin(), v.end()); }
        template<typename T> int indexOf(const std::vector<T>& v, const T& x) {
            auto it = std::find(v.begin(), v.end(), x);
            return it == v.end() ? -1 : (int)(it - v.begin());
        }
        template<typename T> void clear(std::vector<T>& v) { v.clear(); }
    }
"#,
    },
    PreludeModule {
        name: "File",
        includes: &["<filesystem>"],
        source: r#"    namespace File {
        inline bool exists(const std::string& path) { return std::filesystem::exists(path); }
        inline bool isFile(const std::string& path) { return std::filesystem::is_regular_file(path); }
        inline bool isDirectory(const std::string& path) { return std::filesystem::is_directory(path); }
        inline bool createDir(const std::string& path) {
            std::error_code ec;
            return std::filesystem::create_directories(path, ec) && !ec;
        }
        inline bool remove(const std::string& path) {
            std::error_code ec;
            return std::filesystem::remove(path, ec) && !ec;
        }
        inline bool removeAll(const std::string& path) {
            std::error_code ec;
            return std::filesystem::remove_all(path, ec) > 0 && !ec;
        }
        inline bool copy(const std::string& from, const std::string& to) {
            std::error_code ec;
            std::filesystem::copy(from, to, ec);
            return !ec;
        }
        inline bool rename(const std::string& from, const std::string& to) {
            std::error_code ec;
            std::filesystem::rename(from, to, ec);
            return !ec;
        }
        inline int size(const std::string& path) {
            std::error_code ec;
            auto n = std::filesystem::file_size(path, ec);
            return ec ? -1 : (int)n;
        }
    }
"#,
    },
    PreludeModule {
        name: "Time",
        includes: &["<chrono>", "<thread>"],
        source: r#"    namespace Time {
        inline double now() {
            auto t = std::chrono::steady_clock::now().time_since_epoch();
            return std::chrono::duration<double>(t).count();
        }
        inline void sleep(int millis) {
            std::this_thread::sleep_for(std::chrono::milliseconds(millis));
        }
        inline int timestamp() {
            auto t = std::chrono::system_clock::now().time_since_epoch();
            return (int)std::chrono::duration_cast<std::chrono::seconds>(t).count();
        }
    }
"#,
    },
    PreludeModule {
        name: "Random",
        includes: &["<random>"],
        source: r#"    namespace Random {
        inline std::mt19937& engine() {
            static std::mt19937 rng{std::random_device{}()};
            return rng;
        }
        inline int randInt(int low, int high) {
            std::uniform_int_distribution<int> dist(low, high);
            return dist(engine());
        }
        inline double randFloat() {
            std::uniform_real_distribution<double> dist(0.0, 1.0);
            return dist(engine());
        }
        inline bool randBool() { return randInt(0, 1) == 1; }
    }
"#,
    },
    PreludeModule {
        name: "System",
        includes: &["<cstdlib>"],
        source: r#"    namespace System {
        inline void exit(int code) { std::exit(code); }
        inline std::optional<std::string> getEnv(const std::string& name) {
            const char* value = std::getenv(name.c_str());
            if (!value) return std::nullopt;
            return std::string(value);
        }
        inline int execute(const std::string& command) {
            return std::system(command.c_str());
        }
    }
"#,
    },
];

const CORE_IO: &str = r#"    namespace IO {
        inline void print(const std::string& s) { std::cout << s; }
        inline void println(const std::string& s) { std::cout << s << std::endl; }
        inline void eprint(const std::string& s) { std::cerr << s; }
        inline void eprintln(const std::string& s) { std::cerr << s << std::endl; }
        inline std::string readLine() {
            std::string line;
            std::getline(std::cin, line);
            return line;
        }
        inline std::string read() {
            std::string content, line;
            while (std::getline(std::cin, line)) content += line + "\n";
            return content;
        }
        inline std::string readChar() {
            char c;
            std::cin >> c;
            return std::string(1, c);
        }
        inline std::optional<std::string> readFile(const std::string& path) {
            std::ifstream file(path);
            if (!file) return std::nullopt;
            std::stringstream buffer;
            buffer << file.rdbuf();
            return buffer.str();
        }
        inline bool writeFile(const std::string& path, const std::string& content) {
            std::ofstream file(path);
            if (!file) return false;
            file << content;
            return true;
        }
        inline bool appendFile(const std::string& path, const std::string& content) {
            std::ofstream file(path, std::ios::app);
            if (!file) return false;
            file << content;
            return true;
        }
    }
"#;

const CORE_PARSE: &str = r#"    namespace Parse {
        inline std::optional<int> parseInt(const std::string& s) {
            try {
                size_t pos;
                int val = std::stoi(s, &pos);
                if (pos == s.length()) return val;
                return std::nullopt;
            } catch (...) { return std::nullopt; }
        }
        inline std::optional<double> parseFloat(const std::string& s) {
            try {
                size_t pos;
                double val = std::stod(s, &pos);
                if (pos == s.length()) return val;
                return std::nullopt;
            } catch (...) { return std::nullopt; }
        }
        inline std::optional<bool> parseBool(const std::string& s) {
            if (s == "true") return true;
            if (s == "false") return false;
            return std::nullopt;
        }
    }
"#;

const CORE_OPTION: &str = r#"    namespace Option {
        template<typename T> bool isSome(const std::optional<T>& opt) { return opt.has_value(); }
        template<typename T> bool isNone(const std::optional<T>& opt) { return !opt.has_value(); }
        template<typename T> T unwrap(const std::optional<T>& opt) { return opt.value(); }
        template<typename T> T unwrapOr(const std::optional<T>& opt, const T& fallback) {
            return opt.value_or(fallback);
        }
    }
"#;

const TOP_LEVEL_ALIASES: &str = r#"    inline void print(const std::string& s) { IO::print(s); }
    inline void println(const std::string& s) { IO::println(s); }
    inline std::string readLine() { return IO::readLine(); }
    inline std::optional<int> parseInt(const std::string& s) { return Parse::parseInt(s); }
    inline std::optional<double> parseFloat(const std::string& s) { return Parse::parseFloat(s); }
"#;

const TO_STRING_HELPER: &str = r#"template<typename T>
std::string mg_to_string(const T& val) {
    std::ostringstream oss;
    oss << val;
    return oss.str();
}
"#;

/// Emit the prelude text for a program whose `using` set pulls in
/// `used_modules` (short stdlib module names like `"Math"`). Unknown names
/// and modules without a C++ body (Map/Set) are ignored.
pub fn emit_prelude(used_modules: &FxHashSet<String>) -> String {
    let mut includes: Vec<&str> = BASE_INCLUDES.to_vec();
    let selected: Vec<&PreludeModule> = MODULES
        .iter()
        .filter(|m| {
            used_modules.contains(m.name)
                && magolor_stdlib::catalog().is_builtin_module(&format!("Std.{}", m.name))
        })
        .collect();
    for module in &selected {
        for include in module.includes {
            if !includes.contains(include) {
                includes.push(include);
            }
        }
    }

    let mut out = String::new();
    for include in includes {
        out.push_str("#include ");
        out.push_str(include);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("namespace Std {\n");
    out.push_str(CORE_IO);
    out.push('\n');
    out.push_str(CORE_PARSE);
    out.push('\n');
    out.push_str(CORE_OPTION);
    out.push('\n');
    for module in &selected {
        out.push_str(module.source);
        out.push('\n');
    }
    out.push_str(TOP_LEVEL_ALIASES);
    out.push_str("}\n\n");
    out.push_str(TO_STRING_HELPER);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_is_always_present() {
        let prelude = emit_prelude(&FxHashSet::default());
        assert!(prelude.contains("namespace Std {"));
        assert!(prelude.contains("namespace IO {"));
        assert!(prelude.contains("namespace Parse {"));
        assert!(prelude.contains("namespace Option {"));
        assert!(prelude.contains("mg_to_string"));
        assert!(!prelude.contains("namespace Math {"));
    }

    #[test]
    fn used_modules_are_appended_with_includes() {
        let mut used = FxHashSet::default();
        used.insert("Math".to_string());
        used.insert("File".to_string());
        let prelude = emit_prelude(&used);
        assert!(prelude.contains("namespace Math {"));
        assert!(prelude.contains("namespace File {"));
        assert!(prelude.contains("#include <cmath>"));
        assert!(prelude.contains("#include <filesystem>"));
    }

    #[test]
    fn unknown_modules_are_ignored() {
        let mut used = FxHashSet::default();
        used.insert("Quux".to_string());
        let prelude = emit_prelude(&used);
        assert!(!prelude.contains("Quux"));
    }

    #[test]
    fn every_emitted_module_is_in_the_catalog() {
        for module in MODULES {
            assert!(
                magolor_stdlib::catalog().is_builtin_module(&format!("Std.{}", module.name)),
                "prelude module {} missing from catalog",
                module.name
            );
        }
    }
}
