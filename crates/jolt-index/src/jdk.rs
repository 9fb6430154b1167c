//! A small slice of the JDK, written as Java stubs and run through the same
//! declaration pass as workspace sources.

use std::sync::{Arc, OnceLock};

use jolt_core::FileId;
use jolt_syntax::Parse;

const JAVA_LANG: &str = r#"package java.lang;
public class Object {
    public Object();
    public String toString();
    public boolean equals(Object obj);
    public native int hashCode();
    public final native Class<?> getClass();
    protected native Object clone() throws CloneNotSupportedException;
    protected void finalize() throws Throwable;
    public final native void notify();
    public final native void notifyAll();
    public final void wait() throws InterruptedException;
}
public interface CharSequence {
    int length();
    char charAt(int index);
    String toString();
}
public interface Comparable<T> {
    int compareTo(T o);
}
public interface Iterable<T> {
    java.util.Iterator<T> iterator();
    void forEach(java.util.function.Consumer<? super T> action);
}
public interface Runnable {
    void run();
}
public interface AutoCloseable {
    void close() throws Exception;
}
public interface Cloneable {}
public interface Appendable {}
public final class String implements java.io.Serializable, Comparable<String>, CharSequence {
    public String();
    public String(String original);
    public String(char[] value);
    public int length();
    public char charAt(int index);
    public boolean isEmpty();
    public String substring(int begin);
    public String substring(int begin, int end);
    public int indexOf(String str);
    public boolean startsWith(String prefix);
    public boolean endsWith(String suffix);
    public String trim();
    public String toUpperCase();
    public String toLowerCase();
    public int compareTo(String other);
    public boolean equals(Object other);
    public int hashCode();
    public String toString();
    public String[] split(String regex);
    public static String valueOf(Object obj);
    public static String valueOf(int i);
    public static String format(String format, Object... args);
    public static String join(CharSequence delimiter, CharSequence... elements);
}
public final class StringBuilder implements CharSequence, Appendable {
    public StringBuilder();
    public StringBuilder(String str);
    public StringBuilder append(Object obj);
    public StringBuilder append(String str);
    public StringBuilder append(int i);
    public StringBuilder append(char c);
    public int length();
    public char charAt(int index);
    public String toString();
}
public abstract class Number implements java.io.Serializable {
    public Number();
    public abstract int intValue();
    public abstract long longValue();
    public abstract double doubleValue();
}
public final class Integer extends Number implements Comparable<Integer> {
    public static final int MAX_VALUE;
    public static final int MIN_VALUE;
    public Integer(int value);
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Integer other);
    public static Integer valueOf(int i);
    public static int parseInt(String s);
    public static String toString(int i);
}
public final class Long extends Number implements Comparable<Long> {
    public static final long MAX_VALUE;
    public Long(long value);
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Long other);
    public static Long valueOf(long l);
    public static long parseLong(String s);
}
public final class Double extends Number implements Comparable<Double> {
    public Double(double value);
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Double other);
    public static Double valueOf(double d);
    public static double parseDouble(String s);
}
public final class Float extends Number implements Comparable<Float> {
    public Float(float value);
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Float other);
}
public final class Short extends Number implements Comparable<Short> {
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Short other);
}
public final class Byte extends Number implements Comparable<Byte> {
    public int intValue();
    public long longValue();
    public double doubleValue();
    public int compareTo(Byte other);
}
public final class Character implements java.io.Serializable, Comparable<Character> {
    public Character(char value);
    public char charValue();
    public int compareTo(Character other);
    public static boolean isDigit(char ch);
    public static boolean isLetter(char ch);
}
public final class Boolean implements java.io.Serializable, Comparable<Boolean> {
    public static final Boolean TRUE;
    public static final Boolean FALSE;
    public Boolean(boolean value);
    public boolean booleanValue();
    public int compareTo(Boolean other);
    public static Boolean valueOf(boolean b);
}
public final class Void {}
public final class Math {
    public static final double PI;
    public static int max(int a, int b);
    public static long max(long a, long b);
    public static double max(double a, double b);
    public static int min(int a, int b);
    public static long min(long a, long b);
    public static double min(double a, double b);
    public static int abs(int a);
    public static double abs(double a);
    public static double sqrt(double a);
    public static double random();
}
public final class System {
    public static final java.io.PrintStream out;
    public static final java.io.PrintStream err;
    public static long currentTimeMillis();
    public static long nanoTime();
    public static String getProperty(String key);
    public static void arraycopy(Object src, int srcPos, Object dest, int destPos, int length);
}
public final class Class<T> {
    public String getName();
    public String getSimpleName();
}
public abstract class Enum<E extends Enum<E>> implements Comparable<E>, java.io.Serializable {
    protected Enum(String name, int ordinal);
    public final String name();
    public final int ordinal();
    public final int compareTo(E o);
}
public abstract class Record {
    protected Record();
}
public class Thread implements Runnable {
    public Thread();
    public Thread(Runnable target);
    public Thread(Runnable target, String name);
    public void run();
    public void start();
    public void interrupt();
    public static Thread currentThread();
    public static void sleep(long millis) throws InterruptedException;
}
public class Throwable implements java.io.Serializable {
    public Throwable();
    public Throwable(String message);
    public Throwable(String message, Throwable cause);
    public Throwable(Throwable cause);
    public String getMessage();
    public Throwable getCause();
    public void printStackTrace();
}
public class Exception extends Throwable {
    public Exception();
    public Exception(String message);
    public Exception(String message, Throwable cause);
    public Exception(Throwable cause);
}
public class Error extends Throwable {
    public Error();
    public Error(String message);
}
public class RuntimeException extends Exception {
    public RuntimeException();
    public RuntimeException(String message);
    public RuntimeException(String message, Throwable cause);
    public RuntimeException(Throwable cause);
}
public class IllegalArgumentException extends RuntimeException {
    public IllegalArgumentException();
    public IllegalArgumentException(String message);
}
public class IllegalStateException extends RuntimeException {
    public IllegalStateException();
    public IllegalStateException(String message);
}
public class NullPointerException extends RuntimeException {
    public NullPointerException();
    public NullPointerException(String message);
}
public class UnsupportedOperationException extends RuntimeException {
    public UnsupportedOperationException();
    public UnsupportedOperationException(String message);
}
public class IndexOutOfBoundsException extends RuntimeException {
    public IndexOutOfBoundsException();
    public IndexOutOfBoundsException(String message);
}
public class ClassCastException extends RuntimeException {
    public ClassCastException();
}
public class ArithmeticException extends RuntimeException {
    public ArithmeticException();
}
public class CloneNotSupportedException extends Exception {
    public CloneNotSupportedException();
}
public class InterruptedException extends Exception {
    public InterruptedException();
}
public class ReflectiveOperationException extends Exception {
    public ReflectiveOperationException();
}
public class ClassNotFoundException extends ReflectiveOperationException {
    public ClassNotFoundException();
}
public @interface Override {}
public @interface Deprecated {}
public @interface FunctionalInterface {}
public @interface SuppressWarnings {
    String[] value();
}
"#;

const JAVA_IO: &str = r#"package java.io;
public interface Serializable {}
public interface Closeable extends AutoCloseable {
    void close() throws IOException;
}
public interface Flushable {
    void flush() throws IOException;
}
public class IOException extends Exception {
    public IOException();
    public IOException(String message);
    public IOException(String message, Throwable cause);
}
public class FileNotFoundException extends IOException {
    public FileNotFoundException();
    public FileNotFoundException(String message);
}
public class EOFException extends IOException {
    public EOFException();
}
public class UncheckedIOException extends RuntimeException {
    public UncheckedIOException(String message, IOException cause);
    public UncheckedIOException(IOException cause);
}
public class File implements Serializable, Comparable<File> {
    public File(String pathname);
    public File(File parent, String child);
    public String getName();
    public String getPath();
    public boolean exists();
    public int compareTo(File other);
}
public abstract class InputStream implements Closeable {
    public InputStream();
    public abstract int read() throws IOException;
    public void close() throws IOException;
}
public abstract class OutputStream implements Closeable, Flushable {
    public OutputStream();
    public abstract void write(int b) throws IOException;
    public void flush() throws IOException;
    public void close() throws IOException;
}
public abstract class Reader implements Closeable {
    protected Reader();
    public int read() throws IOException;
    public abstract void close() throws IOException;
}
public abstract class Writer implements Closeable, Flushable {
    protected Writer();
    public void write(String str) throws IOException;
    public abstract void flush() throws IOException;
    public abstract void close() throws IOException;
}
public class PrintStream extends OutputStream {
    public PrintStream(OutputStream out);
    public void println();
    public void println(String x);
    public void println(Object x);
    public void println(int x);
    public void println(long x);
    public void println(double x);
    public void println(boolean x);
    public void println(char x);
    public void print(String s);
    public void print(Object obj);
    public void print(int i);
    public PrintStream printf(String format, Object... args);
    public void write(int b);
}
"#;

const JAVA_UTIL: &str = r#"package java.util;
public interface Iterator<E> {
    boolean hasNext();
    E next();
    void remove();
}
public interface Collection<E> extends Iterable<E> {
    int size();
    boolean isEmpty();
    boolean contains(Object o);
    boolean add(E e);
    boolean remove(Object o);
    void clear();
    java.util.stream.Stream<E> stream();
}
public interface List<E> extends Collection<E> {
    E get(int index);
    E set(int index, E element);
    void add(int index, E element);
    E remove(int index);
    int indexOf(Object o);
    static <E> List<E> of(E... elements);
}
public interface Set<E> extends Collection<E> {
    static <E> Set<E> of(E... elements);
}
public interface Queue<E> extends Collection<E> {
    boolean offer(E e);
    E poll();
    E peek();
}
public interface Deque<E> extends Queue<E> {
    void push(E e);
    E pop();
}
public interface Map<K, V> {
    int size();
    boolean isEmpty();
    V get(Object key);
    V put(K key, V value);
    V remove(Object key);
    boolean containsKey(Object key);
    Set<K> keySet();
    Collection<V> values();
    Set<Map.Entry<K, V>> entrySet();
    V getOrDefault(Object key, V defaultValue);
    interface Entry<K, V> {
        K getKey();
        V getValue();
    }
}
public interface Comparator<T> {
    int compare(T o1, T o2);
}
public abstract class AbstractCollection<E> implements Collection<E> {
    protected AbstractCollection();
}
public abstract class AbstractList<E> extends AbstractCollection<E> implements List<E> {
    protected AbstractList();
}
public class ArrayList<E> extends AbstractList<E> implements List<E>, java.io.Serializable {
    public ArrayList();
    public ArrayList(int initialCapacity);
    public ArrayList(Collection<? extends E> c);
}
public class LinkedList<E> extends AbstractList<E> implements List<E>, Deque<E> {
    public LinkedList();
}
public class HashMap<K, V> implements Map<K, V>, java.io.Serializable {
    public HashMap();
    public HashMap(int initialCapacity);
}
public class LinkedHashMap<K, V> extends HashMap<K, V> {
    public LinkedHashMap();
}
public class TreeMap<K, V> implements Map<K, V> {
    public TreeMap();
}
public class HashSet<E> extends AbstractCollection<E> implements Set<E> {
    public HashSet();
}
public class TreeSet<E> extends AbstractCollection<E> implements Set<E> {
    public TreeSet();
}
public class Date implements java.io.Serializable, Cloneable, Comparable<Date> {
    public Date();
    public Date(long date);
    public long getTime();
    public int compareTo(Date other);
}
public final class Optional<T> {
    public static <T> Optional<T> of(T value);
    public static <T> Optional<T> ofNullable(T value);
    public static <T> Optional<T> empty();
    public boolean isPresent();
    public T get();
    public T orElse(T other);
}
public final class Objects {
    public static boolean equals(Object a, Object b);
    public static int hash(Object... values);
    public static <T> T requireNonNull(T obj);
    public static <T> T requireNonNull(T obj, String message);
}
public class Arrays {
    public static <T> List<T> asList(T... a);
    public static String toString(Object[] a);
}
public class Collections {
    public static <T> List<T> emptyList();
    public static <T> List<T> unmodifiableList(List<? extends T> list);
}
public class NoSuchElementException extends RuntimeException {
    public NoSuchElementException();
}
public class ConcurrentModificationException extends RuntimeException {
    public ConcurrentModificationException();
}
"#;

const JAVA_UTIL_FUNCTION: &str = r#"package java.util.function;
public interface Function<T, R> {
    R apply(T t);
}
public interface BiFunction<T, U, R> {
    R apply(T t, U u);
}
public interface Supplier<T> {
    T get();
}
public interface Consumer<T> {
    void accept(T t);
}
public interface BiConsumer<T, U> {
    void accept(T t, U u);
}
public interface Predicate<T> {
    boolean test(T t);
}
public interface UnaryOperator<T> extends Function<T, T> {}
"#;

const JAVA_UTIL_STREAM: &str = r#"package java.util.stream;
public interface Stream<T> {
    Stream<T> filter(java.util.function.Predicate<? super T> predicate);
    <R> Stream<R> map(java.util.function.Function<? super T, ? extends R> mapper);
    void forEach(java.util.function.Consumer<? super T> action);
    long count();
}
"#;

const JAVA_UTIL_CONCURRENT: &str = r#"package java.util.concurrent;
public interface Callable<V> {
    V call() throws Exception;
}
public interface Executor {
    void execute(Runnable command);
}
public class ExecutionException extends Exception {
    public ExecutionException(Throwable cause);
}
public class TimeoutException extends Exception {
    public TimeoutException();
}
"#;

const JAVA_SQL: &str = r#"package java.sql;
public class Date extends java.util.Date {
    public Date(long date);
}
public class Timestamp extends java.util.Date {
    public Timestamp(long time);
}
public class SQLException extends Exception {
    public SQLException();
    public SQLException(String reason);
}
public interface Connection extends AutoCloseable {
    void close() throws SQLException;
}
"#;

const JAVA_AWT: &str = r#"package java.awt;
public class Component {}
public class List extends Component {
    public List();
}
public class Point {
    public int x;
    public int y;
    public Point(int x, int y);
}
"#;

const STUBS: &[(&str, &str)] = &[
    ("jdk/java/lang.java", JAVA_LANG),
    ("jdk/java/io.java", JAVA_IO),
    ("jdk/java/util.java", JAVA_UTIL),
    ("jdk/java/util/function.java", JAVA_UTIL_FUNCTION),
    ("jdk/java/util/stream.java", JAVA_UTIL_STREAM),
    ("jdk/java/util/concurrent.java", JAVA_UTIL_CONCURRENT),
    ("jdk/java/sql.java", JAVA_SQL),
    ("jdk/java/awt.java", JAVA_AWT),
];

/// Parsed stub units, shared by every workspace in the process.
pub(crate) fn stub_units() -> &'static [(FileId, Arc<Parse>)] {
    static UNITS: OnceLock<Vec<(FileId, Arc<Parse>)>> = OnceLock::new();
    UNITS.get_or_init(|| {
        STUBS
            .iter()
            .map(|(path, text)| {
                let parse = jolt_syntax::parse(text);
                if parse.has_errors() {
                    tracing::error!(
                        target: "jolt.index",
                        path,
                        errors = ?parse.diagnostics(),
                        "jdk stub failed to parse"
                    );
                }
                (FileId::new(*path), Arc::new(parse))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn stubs_parse_cleanly() {
        for (file, parse) in super::stub_units() {
            assert!(parse.diagnostics().is_empty(), "{file}: {:?}", parse.diagnostics());
        }
    }
}
