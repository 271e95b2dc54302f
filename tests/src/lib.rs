mod probe;
mod scanning;
