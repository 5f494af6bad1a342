fn main() {
    h2ml::cli::run()
}
